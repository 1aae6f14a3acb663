use colored::Colorize;
use std::{fmt::Display, path::PathBuf, time::Duration};
use url::Url;

use crate::{cli_args::IndexArgs, ingest::pipeline::steps::IndexerSettings};

use super::{error::at_least_one, requires_key, ConfigError};

const DEFAULT_CHECKPOINT_NAME: &str = ".index-checkpoint.json";

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) articles: PathBuf,
    pub(crate) embed_url: Url,
    pub(crate) embed_model_name: String,
    pub(crate) embed_api_key: Option<String>,
    pub(crate) chroma_url: Url,
    pub(crate) collection: String,
    pub(crate) chunk_size: usize,
    pub(crate) chunk_overlap: usize,
    pub(crate) checkpoint: PathBuf,
    pub(crate) settings: IndexerSettings,
}

impl TryFrom<IndexArgs> for Config {
    type Error = ConfigError;

    fn try_from(value: IndexArgs) -> Result<Self, Self::Error> {
        if !value.articles.is_dir() {
            return Err(ConfigError::MissingArticleDirectory(value.articles));
        }
        if value.embed_api_key.is_none() && requires_key(&value.embed_url) {
            return Err(ConfigError::MissingCredentials("EMBED_API_KEY"));
        }
        if value.chunk_size == 0 || value.chunk_overlap >= value.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: value.chunk_size,
                chunk_overlap: value.chunk_overlap,
            });
        }
        let settings = IndexerSettings {
            batch_size: at_least_one(value.batch_size, "batch size")?,
            concurrency: at_least_one(value.concurrency, "concurrency")?,
            max_attempts: at_least_one(value.max_attempts, "max attempts")?,
            initial_backoff: Duration::from_millis(value.initial_backoff_ms),
            max_batches: value.max_batches,
            restart: value.restart,
        };
        let checkpoint = value
            .checkpoint
            .unwrap_or_else(|| value.articles.join(DEFAULT_CHECKPOINT_NAME));

        Ok(Config {
            articles: value.articles,
            embed_url: value.embed_url,
            embed_model_name: value.embed_model_name,
            embed_api_key: value.embed_api_key,
            chroma_url: value.chroma_url,
            collection: value.collection,
            chunk_size: value.chunk_size,
            chunk_overlap: value.chunk_overlap,
            checkpoint,
            settings,
        })
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            articles,
            embed_url,
            embed_model_name,
            embed_api_key: _,
            chroma_url,
            collection,
            chunk_size,
            chunk_overlap,
            checkpoint,
            settings,
        } = self;

        let articles = articles.display().to_string().bright_blue();
        let checkpoint = checkpoint.display().to_string().bright_blue();
        let embed_url = embed_url.as_str().blue();
        let embed_model_name = embed_model_name.bright_blue();
        let chroma_url = chroma_url.as_str().blue();
        let collection = collection.bright_blue();

        write!(
            f,
            "Index running.\n\tReading articles from {articles}.\n\tChunks of {chunk_size} characters, {chunk_overlap} overlapping, {} per batch.\n\tUsing {embed_model_name} embedding service at {embed_url}.\n\tStoring in collection {collection} at {chroma_url}.\n\tCheckpoint at {checkpoint}.",
            settings.batch_size,
        )
    }
}
