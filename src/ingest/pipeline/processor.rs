use std::{fmt::Display, path::Path, sync::Arc, time::Duration};

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use itertools::Itertools;
use tokio::sync::mpsc::channel;

use super::{
    article_store::{write_article, ArticleStore, Claim},
    document::RawPage,
    error::{ArchiveReadError, ArticleStoreError, PipelineError},
    steps::{ArchiveReader, ExtractorStats, PageExtractor},
    wikipedia::{Normalize, Normalized, Rejection, WikiMarkupProcessingError, WikiMarkupProcessor},
};

#[derive(Debug, Clone)]
pub(crate) struct ExtractSettings {
    pub(crate) workers: usize,
    pub(crate) page_timeout: Duration,
    pub(crate) filename_cap: usize,
    pub(crate) limit: Option<usize>,
    pub(crate) excluded_prefixes: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ExtractSummary {
    pub(crate) extractor: ExtractorStats,
    pub(crate) articles_written: usize,
    pub(crate) renamed: usize,
    pub(crate) excluded_namespace: usize,
    pub(crate) redirects: usize,
    pub(crate) empty: usize,
    pub(crate) unnameable: usize,
    pub(crate) normalization_failures: usize,
    pub(crate) write_failures: usize,
}

impl ExtractSummary {
    fn reject(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::ExcludedNamespace(_) => self.excluded_namespace += 1,
            Rejection::Redirect => self.redirects += 1,
            Rejection::EmptyMarkup | Rejection::EmptyText => self.empty += 1,
        }
    }

    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Written { renamed } => {
                self.articles_written += 1;
                if renamed {
                    self.renamed += 1;
                }
            }
            PageOutcome::Rejected(rejection) => self.reject(&rejection),
            PageOutcome::Failed(e) => {
                log::warn!("{e}");
                self.normalization_failures += 1;
            }
            PageOutcome::WriteFailed(e) => {
                log::warn!("{e}");
                self.write_failures += 1;
            }
        }
    }
}

impl Display for ExtractSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let skipped = [
            (self.excluded_namespace, "excluded namespace"),
            (self.redirects, "redirect"),
            (self.empty, "empty"),
            (self.unnameable, "unusable title"),
            (self.normalization_failures, "normalization failure"),
            (self.write_failures, "write failure"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, reason)| format!("{count} {reason}"))
        .join(", ");
        write!(
            f,
            "{} articles written ({} renamed after a filename collision)",
            self.articles_written, self.renamed
        )?;
        if !skipped.is_empty() {
            write!(f, "; skipped: {skipped}")?;
        }
        write!(f, "; extractor: {}", self.extractor)
    }
}

enum PageOutcome {
    Written { renamed: bool },
    Rejected(Rejection),
    Failed(WikiMarkupProcessingError),
    WriteFailed(ArticleStoreError),
}

/// Normalizes on the blocking pool under `timeout`. A parser that panics or
/// hangs costs this page only; a hung parser keeps its blocking thread.
async fn normalize_page<N: Normalize + Send + Sync + 'static>(
    processor: Arc<N>,
    page: RawPage,
    claim: Claim,
    timeout: Duration,
) -> PageOutcome {
    let title = page.title.clone();
    let task = tokio::task::spawn_blocking(move || processor.normalize(&page));

    let text = match tokio::time::timeout(timeout, task).await {
        Err(_) => {
            return PageOutcome::Failed(WikiMarkupProcessingError::TimedOut {
                title,
                limit: timeout,
            })
        }
        Ok(Err(_)) => return PageOutcome::Failed(WikiMarkupProcessingError::Panicked(title)),
        Ok(Ok(Err(e))) => return PageOutcome::Failed(e),
        Ok(Ok(Ok(Normalized::Rejected(rejection)))) => return PageOutcome::Rejected(rejection),
        Ok(Ok(Ok(Normalized::Article(text)))) => text,
    };

    let Claim { path, renamed } = claim;
    match tokio::task::spawn_blocking(move || write_article(&path, &text)).await {
        Ok(Ok(())) => PageOutcome::Written { renamed },
        Ok(Err(e)) => PageOutcome::WriteFailed(e),
        Err(_) => PageOutcome::Failed(WikiMarkupProcessingError::Panicked(title)),
    }
}

/// Streams pages out of the archive on one blocking thread and stops quietly
/// once the receiving side has gone away.
fn read_pages(
    reader: ArchiveReader,
    sender: tokio::sync::mpsc::Sender<RawPage>,
    progress: ProgressBar,
) -> Result<ExtractorStats, ArchiveReadError> {
    let mut extractor = PageExtractor::new(reader);
    for page in extractor.by_ref() {
        let page = page?;
        progress.inc_length(1);
        if sender.blocking_send(page).is_err() {
            break;
        }
    }
    Ok(extractor.stats())
}

pub(crate) struct PipelineProcessor {
    settings: ExtractSettings,
}

impl PipelineProcessor {
    pub(crate) fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }

    /// Archive -> pages -> plain text articles in `output_directory`.
    ///
    /// Page extraction is sequential. Cheap classification and file name claims
    /// happen in page order on this task, so collision suffixes are
    /// deterministic; parsing and writing run on up to `workers` pages at once.
    pub(crate) async fn process(
        &self,
        progress: &ProgressBar,
        archive: &Path,
        output_directory: &Path,
    ) -> Result<ExtractSummary, PipelineError> {
        let mut store = ArticleStore::open(output_directory, self.settings.filename_cap)?;
        let reader = ArchiveReader::open(archive)?;
        log::info!(
            "Reading {} archive {}",
            reader.format(),
            archive.display()
        );
        let processor = Arc::new(WikiMarkupProcessor::new(
            self.settings.excluded_prefixes.clone(),
        )?);

        let workers = self.settings.workers.max(1);
        let (sender, mut receiver) = channel::<RawPage>(workers * 4);
        let producer_progress = progress.clone();
        let producer =
            tokio::task::spawn_blocking(move || read_pages(reader, sender, producer_progress));

        progress.set_message("Extracting");
        let limit = self.settings.limit.unwrap_or(usize::MAX);
        let mut summary = ExtractSummary::default();
        let mut in_flight = FuturesUnordered::new();
        let mut receiving = true;

        loop {
            let room = in_flight.len() < workers
                && summary.articles_written + in_flight.len() < limit;
            tokio::select! {
                page = receiver.recv(), if receiving && room => match page {
                    Some(page) => match processor.classify(&page) {
                        Some(rejection) => {
                            summary.reject(&rejection);
                            progress.inc(1);
                        }
                        None => match store.claim(&page.title) {
                            Some(claim) => in_flight.push(normalize_page(
                                processor.clone(),
                                page,
                                claim,
                                self.settings.page_timeout,
                            )),
                            None => {
                                log::warn!("No usable file name for '{}'", page.title);
                                summary.unnameable += 1;
                                progress.inc(1);
                            }
                        },
                    },
                    None => receiving = false,
                },
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    summary.record(outcome);
                    progress.inc(1);
                },
                else => break,
            }
        }
        drop(receiver);
        log::debug!("Articles in {}", store.directory().display());

        summary.extractor = producer.await??;
        progress.finish_with_message("Extracted");
        Ok(summary)
    }
}
