use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

use crate::cli_args::SanitizeArgs;

use super::{error::at_least_one, ConfigError};

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) articles: PathBuf,
    pub(crate) prefix_chars: usize,
}

impl TryFrom<SanitizeArgs> for Config {
    type Error = ConfigError;

    fn try_from(value: SanitizeArgs) -> Result<Self, Self::Error> {
        if !value.articles.is_dir() {
            return Err(ConfigError::MissingArticleDirectory(value.articles));
        }
        Ok(Config {
            articles: value.articles,
            prefix_chars: at_least_one(value.prefix_chars, "prefix chars")?,
        })
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let articles = self.articles.display().to_string().bright_blue();
        write!(
            f,
            "Sanitize running.\n\tRemoving redirect stubs from {articles}.\n\tInspecting the first {} characters of each article.",
            self.prefix_chars
        )
    }
}
