use std::{
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result},
};

#[derive(Debug)]
pub(crate) enum IndexError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode, String),
    MalformedResponse(String),
}

impl StdError for IndexError {}

impl From<reqwest::Error> for IndexError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value)
    }
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            IndexError::Request(err) => write!(f, "VectorStore: {}", err),
            IndexError::Status(status, body) => write!(f, "VectorStore: {} {}", status, body),
            IndexError::MalformedResponse(reason) => {
                write!(f, "VectorStore: Malformed response: {}", reason)
            }
        }
    }
}
