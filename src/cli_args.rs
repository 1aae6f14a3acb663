use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::ingest::download::DEFAULT_DUMP_URL;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Fetch a dump over HTTP.
    Download(DownloadArgs),
    /// Turn a dump into one plain text file per article.
    Extract(ExtractArgs),
    /// Remove redirect stubs from an article directory.
    Sanitize(SanitizeArgs),
    /// Chunk, embed and store every article, resuming from the last checkpoint.
    Index(IndexArgs),
    /// Retrieve passages for a question and optionally generate an answer.
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub(crate) struct DownloadArgs {
    #[arg(long, default_value = DEFAULT_DUMP_URL)]
    pub(crate) url: Url,
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Parser, Debug)]
pub(crate) struct ExtractArgs {
    #[arg(long)]
    pub(crate) wiki_xml: PathBuf,
    #[arg(long)]
    pub(crate) output_directory: PathBuf,
    /// Stop after this many articles have been written.
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Pages normalized concurrently; defaults to the available parallelism.
    #[arg(long)]
    pub(crate) workers: Option<usize>,
    #[arg(long, default_value_t = 60)]
    pub(crate) page_timeout_secs: u64,
    #[arg(long, default_value_t = 100)]
    pub(crate) filename_cap: usize,
    /// Title prefixes to skip; replaces the built-in namespace list when given.
    #[arg(long = "exclude-prefix")]
    pub(crate) exclude_prefixes: Vec<String>,
}

#[derive(Parser, Debug)]
pub(crate) struct SanitizeArgs {
    #[arg(long)]
    pub(crate) articles: PathBuf,
    #[arg(long, default_value_t = 100)]
    pub(crate) prefix_chars: usize,
}

#[derive(Parser, Debug)]
pub(crate) struct IndexArgs {
    #[arg(long)]
    pub(crate) articles: PathBuf,
    #[arg(long)]
    pub(crate) embed_url: Url,
    #[arg(long)]
    pub(crate) embed_model_name: String,
    #[arg(long, env = "EMBED_API_KEY", hide_env_values = true)]
    pub(crate) embed_api_key: Option<String>,
    #[arg(long, default_value = "http://localhost:8000")]
    pub(crate) chroma_url: Url,
    #[arg(long, default_value = "wikivoyage")]
    pub(crate) collection: String,
    #[arg(long, default_value_t = 1000)]
    pub(crate) chunk_size: usize,
    #[arg(long, default_value_t = 200)]
    pub(crate) chunk_overlap: usize,
    #[arg(long, default_value_t = 512)]
    pub(crate) batch_size: usize,
    /// Batches embedded at the same time.
    #[arg(long, default_value_t = 4)]
    pub(crate) concurrency: usize,
    #[arg(long, default_value_t = 5)]
    pub(crate) max_attempts: usize,
    #[arg(long, default_value_t = 500)]
    pub(crate) initial_backoff_ms: u64,
    /// Stop after submitting this many batches.
    #[arg(long)]
    pub(crate) max_batches: Option<usize>,
    /// Defaults to `.index-checkpoint.json` inside the article directory.
    #[arg(long)]
    pub(crate) checkpoint: Option<PathBuf>,
    /// Discard any existing checkpoint and index from the first batch.
    #[arg(long)]
    pub(crate) restart: bool,
}

#[derive(Parser, Debug)]
pub(crate) struct QueryArgs {
    pub(crate) question: String,
    #[arg(long)]
    pub(crate) embed_url: Url,
    #[arg(long)]
    pub(crate) embed_model_name: String,
    #[arg(long, env = "EMBED_API_KEY", hide_env_values = true)]
    pub(crate) embed_api_key: Option<String>,
    #[arg(long, default_value = "http://localhost:8000")]
    pub(crate) chroma_url: Url,
    #[arg(long, default_value = "wikivoyage")]
    pub(crate) collection: String,
    #[arg(short, long, default_value_t = 8)]
    pub(crate) k: usize,
    #[arg(long, default_value_t = 0.5)]
    pub(crate) min_score: f32,
    #[arg(long, default_value = "https://api.groq.com/openai/v1")]
    pub(crate) llm_url: Url,
    #[arg(long, default_value = "llama-3.1-8b-instant")]
    pub(crate) llm_model_name: String,
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub(crate) llm_api_key: Option<String>,
    #[arg(long, default_value_t = 0.1)]
    pub(crate) temperature: f32,
    #[arg(long, default_value_t = 1024)]
    pub(crate) max_tokens: u16,
    /// Print the ranked sources only.
    #[arg(long)]
    pub(crate) no_answer: bool,
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn index_defaults() {
        let cli = Cli::parse_from([
            "voyagedex",
            "index",
            "--articles",
            "kb",
            "--embed-url",
            "http://localhost:9000/v1",
            "--embed-model-name",
            "nomic-embed-text",
        ]);
        let Commands::Index(args) = cli.command else {
            panic!("expected the index command");
        };
        assert_eq!(args.chunk_size, 1000);
        assert_eq!(args.chunk_overlap, 200);
        assert_eq!(args.batch_size, 512);
        assert_eq!(args.max_attempts, 5);
        assert_eq!(args.initial_backoff_ms, 500);
        assert!(!args.restart);
    }

    #[test]
    fn query_defaults() {
        let cli = Cli::parse_from([
            "voyagedex",
            "query",
            "What to see in Paris?",
            "--embed-url",
            "http://localhost:9000/v1",
            "--embed-model-name",
            "nomic-embed-text",
        ]);
        let Commands::Query(args) = cli.command else {
            panic!("expected the query command");
        };
        assert_eq!(args.question, "What to see in Paris?");
        assert_eq!(args.k, 8);
        assert_eq!(args.min_score, 0.5);
        assert_eq!(args.llm_model_name, "llama-3.1-8b-instant");
        assert_eq!(args.temperature, 0.1);
    }
}
