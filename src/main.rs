#[cfg(test)]
mod fakes;
#[cfg(test)]
mod test_data;

mod cli_args;
mod config;
mod embedding_client;
mod formatter;
mod index;
mod inference;
mod ingest;
mod llm_client;
mod progress;

use std::{process::ExitCode, time::Duration};

use async_openai::{config::OpenAIConfig, Client};
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use tokio::runtime::Runtime;
use url::Url;

use crate::{
    cli_args::{Cli, Commands},
    config::{
        download::Config as DownloadConfig, extract::Config as ExtractConfig,
        index::Config as IndexConfig, query::Config as QueryConfig,
        sanitize::Config as SanitizeConfig, ConfigError,
    },
    embedding_client::EmbeddingClient,
    formatter::TextFormatter,
    index::ChromaIndex,
    inference::{Answer, Engine, Retriever},
    ingest::{
        download::download,
        pipeline::{
            article_store::list_articles,
            steps::{
                corpus_digest, BatchIndexer, CheckpointStore, CorpusSanitizer, Fingerprint,
                RecursiveCharacterTextSplitter,
            },
            PipelineProcessor,
        },
    },
    llm_client::OpenAiChatClient,
    progress::{new_byte_progress_bar, new_progress_bar},
};

fn main() -> ExitCode {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .build();

    let multi_progress = MultiProgress::new();

    if let Err(e) = LogWrapper::new(multi_progress.clone(), logger).try_init() {
        eprintln!("Logging unavailable: {e}");
    }

    match run(Cli::parse().command, &multi_progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<ConfigError>().is_some() => {
            log::error!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Blocking work still running after this is abandoned. Only parsers that
/// outlived their page timeout are left by then.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn run(command: Commands, multi_progress: &MultiProgress) -> anyhow::Result<()> {
    let system_runner = Runtime::new()?;
    let result = execute(command, multi_progress, &system_runner);
    shut_down(system_runner);
    result
}

fn shut_down(system_runner: Runtime) {
    system_runner.shutdown_timeout(SHUTDOWN_GRACE);
}

fn execute(
    command: Commands,
    multi_progress: &MultiProgress,
    system_runner: &Runtime,
) -> anyhow::Result<()> {
    match command {
        Commands::Download(download_args) => {
            // ./voyagedex download --output /data/enwikivoyage.xml.bz2
            let config = DownloadConfig::from(download_args);
            log::info!("\n{config}");

            let progress = new_byte_progress_bar(multi_progress, 0);
            let bytes = system_runner.block_on(download(&config.url, &config.output, &progress))?;
            log::info!("Downloaded {bytes} bytes to {}", config.output.display());
            Ok(())
        }
        Commands::Extract(extract_args) => {
            // ./voyagedex extract \
            //     --wiki-xml /data/enwikivoyage.xml.bz2 \
            //     --output-directory /data/articles
            let config = ExtractConfig::try_from(extract_args)?;
            log::info!("\n{config}");

            let progress = new_progress_bar(multi_progress, 0);
            let pipeline = PipelineProcessor::new(config.settings);
            let summary = system_runner.block_on(pipeline.process(
                &progress,
                &config.wiki_xml,
                &config.output_directory,
            ))?;
            log::info!("{summary}");
            Ok(())
        }
        Commands::Sanitize(sanitize_args) => {
            let config = SanitizeConfig::try_from(sanitize_args)?;
            log::info!("\n{config}");

            let progress = new_progress_bar(multi_progress, 0);
            let summary =
                CorpusSanitizer::new(config.prefix_chars).sanitize(&config.articles, &progress)?;
            log::info!("{summary}");
            Ok(())
        }
        Commands::Index(index_args) => {
            // ./voyagedex index \
            //     --articles /data/articles \
            //     --embed-url http://infinity:9000/v1 \
            //     --embed-model-name nomic-ai/nomic-embed-text-v1.5 \
            //     --chroma-url http://chroma:8000
            let config = IndexConfig::try_from(index_args)?;
            log::info!("\n{config}");

            let articles = list_articles(&config.articles)?;
            log::info!("{} articles to index", articles.len());
            let splitter =
                RecursiveCharacterTextSplitter::new(config.chunk_size, config.chunk_overlap, None);
            let fingerprint = Fingerprint {
                chunk_size: splitter.chunk_size(),
                chunk_overlap: splitter.chunk_overlap(),
                batch_size: config.settings.batch_size,
                embed_model: config.embed_model_name.clone(),
                collection: config.collection.clone(),
                corpus: corpus_digest(&articles),
            };
            let checkpoint = CheckpointStore::new(config.checkpoint, fingerprint);

            let embed_client = EmbeddingClient::new(
                openai_client(&config.embed_url, config.embed_api_key),
                config.embed_model_name,
            );
            let (chroma_url, collection, settings) =
                (config.chroma_url, config.collection, config.settings);
            let progress = new_progress_bar(multi_progress, 0);

            let summary = system_runner.block_on(async {
                let index = ChromaIndex::connect(&chroma_url, &collection).await?;
                let indexer = BatchIndexer::new(&embed_client, &index, checkpoint, settings);
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::warn!("Interrupt handler unavailable: {e}");
                        std::future::pending::<()>().await;
                    }
                };
                indexer
                    .run(articles, splitter, &progress, shutdown)
                    .await
                    .map_err(anyhow::Error::from)
            })?;
            log::info!("{summary}");
            Ok(())
        }
        Commands::Query(query_args) => {
            let config = QueryConfig::try_from(query_args)?;
            log::info!("\n{config}");

            let embed_client = EmbeddingClient::new(
                openai_client(&config.embed_url, config.embed_api_key),
                config.embed_model_name,
            );
            let llm_client = config.llm.map(|llm| {
                OpenAiChatClient::new(
                    openai_client(&llm.url, Some(llm.api_key)),
                    llm.model_name,
                    llm.temperature,
                    llm.max_tokens,
                )
            });

            let (chroma_url, collection, question) =
                (config.chroma_url, config.collection, config.question);
            let (k, min_score) = (config.k, config.min_score);

            let answer = system_runner.block_on(async {
                let index = ChromaIndex::connect(&chroma_url, &collection).await?;
                let engine = Engine::new(
                    Retriever::new(&embed_client, &index),
                    llm_client.as_ref(),
                    k,
                    min_score,
                );
                engine
                    .ask(&question)
                    .await
                    .map_err(anyhow::Error::from)
            })?;

            match answer {
                Answer::NoConfidentAnswer => println!("no confident answer"),
                Answer::Sources(sources) => print_sources(&sources),
                Answer::Generated { sources, answer } => {
                    print_sources(&sources);
                    println!("\n{answer}");
                }
            }
            Ok(())
        }
    }
}

fn openai_client(url: &Url, api_key: Option<String>) -> Client<OpenAIConfig> {
    let openai_config = OpenAIConfig::new().with_api_base(url.as_str().trim_end_matches('/'));
    let openai_config = match api_key {
        Some(api_key) => openai_config.with_api_key(api_key),
        None => openai_config,
    };
    Client::with_config(openai_config)
}

fn print_sources(sources: &[impl TextFormatter]) {
    for (rank, source) in sources.iter().enumerate() {
        println!("{}", source.format_document(rank + 1));
    }
}

#[cfg(test)]
mod test {
    use std::time::Instant;

    use super::*;

    #[test]
    fn shutdown_does_not_wait_for_a_timed_out_parser() {
        let system_runner = Runtime::new().unwrap();
        let outcome = system_runner.block_on(tokio::time::timeout(
            Duration::from_millis(10),
            tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(4))),
        ));
        assert!(outcome.is_err());

        let started = Instant::now();
        shut_down(system_runner);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
