use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
    time::Duration,
};

#[derive(Debug)]
pub(crate) enum WikiMarkupProcessingError {
    Regex(regex::Error),
    Panicked(String),
    TimedOut { title: String, limit: Duration },
}

impl From<regex::Error> for WikiMarkupProcessingError {
    fn from(value: regex::Error) -> Self {
        Self::Regex(value)
    }
}

impl Error for WikiMarkupProcessingError {}
impl Display for WikiMarkupProcessingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            WikiMarkupProcessingError::Regex(e) => write!(f, "WikiMarkupProcessingError::Regex {e}"),
            WikiMarkupProcessingError::Panicked(title) => {
                write!(f, "WikiMarkupProcessingError::Panicked while parsing '{title}'")
            }
            WikiMarkupProcessingError::TimedOut { title, limit } => write!(
                f,
                "WikiMarkupProcessingError::TimedOut '{title}' took longer than {}s",
                limit.as_secs()
            ),
        }
    }
}
