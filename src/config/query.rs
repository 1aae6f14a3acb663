use colored::Colorize;
use std::fmt::Display;
use url::Url;

use crate::cli_args::QueryArgs;

use super::{requires_key, ConfigError};

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) question: String,
    pub(crate) embed_url: Url,
    pub(crate) embed_model_name: String,
    pub(crate) embed_api_key: Option<String>,
    pub(crate) chroma_url: Url,
    pub(crate) collection: String,
    pub(crate) k: usize,
    pub(crate) min_score: f32,
    pub(crate) llm: Option<LlmConfig>,
}

/// Absent when only the ranked sources are wanted.
#[derive(Debug)]
pub(crate) struct LlmConfig {
    pub(crate) url: Url,
    pub(crate) model_name: String,
    pub(crate) api_key: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u16,
}

impl TryFrom<QueryArgs> for Config {
    type Error = ConfigError;

    fn try_from(value: QueryArgs) -> Result<Self, Self::Error> {
        if !(-1.0..=1.0).contains(&value.min_score) {
            return Err(ConfigError::InvalidScore(value.min_score));
        }
        if value.embed_api_key.is_none() && requires_key(&value.embed_url) {
            return Err(ConfigError::MissingCredentials("EMBED_API_KEY"));
        }
        let llm = if value.no_answer {
            None
        } else {
            let api_key = value
                .llm_api_key
                .ok_or(ConfigError::MissingCredentials("GROQ_API_KEY"))?;
            Some(LlmConfig {
                url: value.llm_url,
                model_name: value.llm_model_name,
                api_key,
                temperature: value.temperature,
                max_tokens: value.max_tokens,
            })
        };

        Ok(Config {
            question: value.question,
            embed_url: value.embed_url,
            embed_model_name: value.embed_model_name,
            embed_api_key: value.embed_api_key,
            chroma_url: value.chroma_url,
            collection: value.collection,
            k: value.k,
            min_score: value.min_score,
            llm,
        })
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            question: _,
            embed_url,
            embed_model_name,
            embed_api_key: _,
            chroma_url,
            collection,
            k,
            min_score,
            llm,
        } = self;

        let embed_url = embed_url.as_str().blue();
        let embed_model_name = embed_model_name.bright_blue();
        let chroma_url = chroma_url.as_str().blue();
        let collection = collection.bright_blue();

        write!(
            f,
            "Query running.\n\tUsing {embed_model_name} embedding service at {embed_url}.\n\tSearching collection {collection} at {chroma_url} for {k} passages scoring at least {min_score}."
        )?;
        match llm {
            Some(llm) => write!(
                f,
                "\n\tAnswering with {} at {}.",
                llm.model_name.bright_blue(),
                llm.url.as_str().blue()
            ),
            None => write!(f, "\n\tSources only."),
        }
    }
}
