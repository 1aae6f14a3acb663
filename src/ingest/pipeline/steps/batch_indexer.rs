use std::{
    cell::Cell,
    fmt::Display,
    future::Future,
    path::PathBuf,
    time::Duration,
};

use backoff::{future::retry_notify, ExponentialBackoffBuilder};
use futures::{stream, StreamExt};
use indicatif::ProgressBar;
use tokio::sync::mpsc::{channel, Sender};

use super::{
    batcher::Batcher,
    checkpoint::{CheckpointStore, Progress},
    recursive_text_splitter::RecursiveCharacterTextSplitter,
};
use crate::{
    embedding_client::{EmbeddingClientService, EmbeddingServiceError},
    index::{IndexEntry, VectorStore},
    ingest::pipeline::{
        article_store::read_article,
        document::IndexBatch,
        error::{BatchSubmitError, CheckpointError, PipelineError, SubmitError},
    },
};

#[derive(Debug, Clone)]
pub(crate) struct IndexerSettings {
    pub(crate) batch_size: usize,
    pub(crate) concurrency: usize,
    pub(crate) max_attempts: usize,
    pub(crate) initial_backoff: Duration,
    pub(crate) max_batches: Option<usize>,
    pub(crate) restart: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ProducerStats {
    articles_read: usize,
    articles_unreadable: usize,
    chunks: usize,
    batches: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct IndexSummary {
    pub(crate) resumed_from: usize,
    pub(crate) batches_submitted: usize,
    pub(crate) completed_batches: usize,
    pub(crate) articles_read: usize,
    pub(crate) articles_unreadable: usize,
    /// Chunks produced up to the point where the run stopped.
    pub(crate) chunks_seen: usize,
    pub(crate) interrupted: bool,
    pub(crate) finished: bool,
}

impl Display for IndexSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} batches submitted (resumed at batch {}), {} articles read, {} unreadable, {} chunks",
            self.batches_submitted,
            self.resumed_from,
            self.articles_read,
            self.articles_unreadable,
            self.chunks_seen
        )?;
        if self.finished {
            write!(f, "; corpus fully indexed")
        } else if self.interrupted {
            write!(f, "; interrupted, next run resumes at batch {}", self.completed_batches)
        } else {
            write!(f, "; stopped early, next run resumes at batch {}", self.completed_batches)
        }
    }
}

/// The articles no longer split into the batches the checkpoint counted.
#[derive(Debug)]
struct BoundaryMoved {
    found: Option<String>,
}

fn check_boundary(batch: &IndexBatch, resume: &Progress) -> Result<(), BoundaryMoved> {
    let found = batch.chunks.last().map(|chunk| chunk.id());
    match &resume.last_chunk_id {
        Some(expected) if found.as_ref() != Some(expected) => Err(BoundaryMoved { found }),
        _ => Ok(()),
    }
}

/// Chunks articles in file order on the blocking pool and sends every batch after
/// the checkpoint. The last skipped batch must end on the chunk the checkpoint
/// recorded. Stops quietly once the receiver is gone.
fn produce_batches(
    articles: Vec<PathBuf>,
    splitter: RecursiveCharacterTextSplitter,
    batch_size: usize,
    resume: Progress,
    sender: Sender<IndexBatch>,
    progress: ProgressBar,
) -> Result<ProducerStats, BoundaryMoved> {
    let mut stats = ProducerStats::default();
    let mut batcher = Batcher::new(batch_size);
    let resume_from = resume.completed_batches;
    let deliver = |batch: IndexBatch, stats: &mut ProducerStats| -> Result<bool, BoundaryMoved> {
        stats.batches += 1;
        if batch.index < resume_from {
            if batch.index + 1 == resume_from {
                check_boundary(&batch, &resume)?;
            }
            return Ok(true);
        }
        progress.inc_length(1);
        Ok(sender.blocking_send(batch).is_ok())
    };

    for path in articles {
        let article = match read_article(&path) {
            Ok(article) => article,
            Err(e) => {
                log::warn!("{e}");
                stats.articles_unreadable += 1;
                continue;
            }
        };
        stats.articles_read += 1;
        for chunk in splitter.split_article(&article) {
            stats.chunks += 1;
            if let Some(batch) = batcher.push(chunk) {
                if !deliver(batch, &mut stats)? {
                    return Ok(stats);
                }
            }
        }
    }
    if let Some(batch) = batcher.finish() {
        deliver(batch, &mut stats)?;
    }
    if stats.batches < resume_from {
        return Err(BoundaryMoved { found: None });
    }
    Ok(stats)
}

/// Embeds and stores batches in order, advancing the checkpoint after each one.
///
/// Up to `concurrency` batches are in flight, but completions are consumed in
/// batch order, so the checkpoint only ever covers a contiguous prefix. A batch
/// that was stored but not yet checkpointed when the run stopped is submitted
/// again by the next run; chunk ids are stable and the store upserts, so the
/// repeat overwrites identical entries.
pub(crate) struct BatchIndexer<'a, E: EmbeddingClientService, S: VectorStore> {
    embedder: &'a E,
    store: &'a S,
    checkpoint: CheckpointStore,
    settings: IndexerSettings,
}

impl<'a, E: EmbeddingClientService, S: VectorStore> BatchIndexer<'a, E, S> {
    pub(crate) fn new(
        embedder: &'a E,
        store: &'a S,
        checkpoint: CheckpointStore,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            checkpoint,
            settings,
        }
    }

    async fn submit_once(&self, batch: &IndexBatch) -> Result<(), SubmitError> {
        let texts = batch
            .chunks
            .iter()
            .map(|chunk| chunk.text.clone())
            .collect::<Vec<_>>();
        let embeddings = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != batch.chunks.len() {
            return Err(EmbeddingServiceError::EmbeddingSizeMismatch(
                batch.chunks.len(),
                embeddings.len(),
            )
            .into());
        }

        let entries = batch
            .chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                id: chunk.id(),
                text: chunk.text.clone(),
                embedding,
                source_title: chunk.source_title.clone(),
                source_path: chunk.source_path.clone(),
                sequence_index: chunk.sequence_index,
            })
            .collect();
        self.store.add(entries).await?;
        Ok(())
    }

    async fn submit(&self, batch: IndexBatch) -> Result<Progress, BatchSubmitError> {
        let attempt_counter = Cell::new(0usize);
        let attempts = &attempt_counter;
        let max_attempts = self.settings.max_attempts.max(1);
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.settings.initial_backoff)
            .with_max_elapsed_time(None)
            .build();

        let pending = &batch;
        let result = retry_notify(
            policy,
            move || async move {
                attempts.set(attempts.get() + 1);
                match self.submit_once(pending).await {
                    Ok(()) => Ok(()),
                    Err(e) if attempts.get() >= max_attempts => Err(backoff::Error::permanent(e)),
                    Err(e) => Err(backoff::Error::transient(e)),
                }
            },
            |e: SubmitError, wait: Duration| {
                log::warn!(
                    "Batch {} attempt {}/{} failed: {e}. Retrying in {}ms",
                    batch.index,
                    attempts.get(),
                    max_attempts,
                    wait.as_millis()
                )
            },
        )
        .await;

        result
            .map(|()| Progress {
                completed_batches: batch.index + 1,
                last_chunk_id: batch.chunks.last().map(|chunk| chunk.id()),
            })
            .map_err(|cause| BatchSubmitError {
                batch_index: batch.index,
                attempts: attempts.get(),
                cause,
            })
    }

    /// Runs until every batch is stored, `max_batches` were submitted, or `shutdown` resolves.
    pub(crate) async fn run(
        &self,
        articles: Vec<PathBuf>,
        splitter: RecursiveCharacterTextSplitter,
        progress: &ProgressBar,
        shutdown: impl Future<Output = ()>,
    ) -> Result<IndexSummary, PipelineError> {
        let resume = self.checkpoint.load(self.settings.restart)?;
        let resume_from = resume.completed_batches;
        let expected_boundary = resume.last_chunk_id.clone();
        if resume_from > 0 {
            log::info!(
                "Resuming after {resume_from} completed batches recorded in {}",
                self.checkpoint.path().display()
            );
        }
        progress.set_message("Indexing");

        let (sender, mut receiver) = channel::<IndexBatch>(self.settings.concurrency.max(1) * 2);
        let batch_size = self.settings.batch_size;
        let producer_progress = progress.clone();
        let producer = tokio::task::spawn_blocking(move || {
            produce_batches(
                articles,
                splitter,
                batch_size,
                resume,
                sender,
                producer_progress,
            )
        });

        let limit = self.settings.max_batches.unwrap_or(usize::MAX);
        let mut submissions = Box::pin(
            stream::poll_fn(move |cx| receiver.poll_recv(cx))
                .take(limit)
                .map(|batch| self.submit(batch))
                .buffered(self.settings.concurrency.max(1)),
        );
        let mut shutdown = Box::pin(shutdown);

        let mut summary = IndexSummary {
            resumed_from: resume_from,
            completed_batches: resume_from,
            ..IndexSummary::default()
        };
        let mut exhausted = false;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::warn!("Interrupted; batches in flight are not recorded as complete");
                    summary.interrupted = true;
                    break;
                }
                next = submissions.next() => match next {
                    Some(Ok(completed)) => {
                        self.checkpoint.commit(&completed)?;
                        summary.completed_batches = completed.completed_batches;
                        summary.batches_submitted += 1;
                        progress.inc(1);
                    }
                    Some(Err(e)) => {
                        log::error!("{e}");
                        return Err(e.into());
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
        }
        drop(submissions);

        let stats = producer.await?.map_err(|moved| CheckpointError::CorpusChanged {
            path: self.checkpoint.path().to_path_buf(),
            batch: resume_from.saturating_sub(1),
            expected: expected_boundary,
            found: moved.found,
        })?;
        summary.articles_read = stats.articles_read;
        summary.articles_unreadable = stats.articles_unreadable;
        summary.chunks_seen = stats.chunks;
        summary.finished = exhausted && summary.completed_batches >= stats.batches;
        progress.finish_with_message("Indexed");
        Ok(summary)
    }
}
