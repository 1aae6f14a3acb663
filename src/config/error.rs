use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
    path::PathBuf,
};

#[derive(Debug)]
pub(crate) enum ConfigError {
    MissingArchive(PathBuf),
    MissingArticleDirectory(PathBuf),
    MissingCredentials(&'static str),
    InvalidChunking { chunk_size: usize, chunk_overlap: usize },
    InvalidCount(&'static str),
    InvalidScore(f32),
}

impl Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ConfigError::MissingArchive(path) => {
                write!(f, "ConfigError: no archive at {}", path.display())
            }
            ConfigError::MissingArticleDirectory(path) => {
                write!(f, "ConfigError: {} is not a directory", path.display())
            }
            ConfigError::MissingCredentials(variable) => {
                write!(f, "ConfigError: no API key given; set {variable}")
            }
            ConfigError::InvalidChunking {
                chunk_size,
                chunk_overlap,
            } => write!(
                f,
                "ConfigError: chunk overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            ),
            ConfigError::InvalidCount(name) => {
                write!(f, "ConfigError: {name} must be at least 1")
            }
            ConfigError::InvalidScore(score) => {
                write!(f, "ConfigError: minimum score {score} is outside [-1, 1]")
            }
        }
    }
}

pub(super) fn at_least_one(value: usize, name: &'static str) -> std::result::Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidCount(name))
    } else {
        Ok(value)
    }
}
