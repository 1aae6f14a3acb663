use std::{
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result},
    io,
    path::PathBuf,
};

use tokio::task::JoinError;

use crate::{embedding_client::EmbeddingServiceError, index::IndexError};

use super::{steps::Fingerprint, wikipedia::WikiMarkupProcessingError};

#[derive(Debug)]
pub(crate) enum PipelineError {
    Archive(ArchiveReadError),
    ArticleStore(ArticleStoreError),
    Checkpoint(CheckpointError),
    BatchSubmit(BatchSubmitError),
    Download(DownloadError),
    Normalizer(WikiMarkupProcessingError),
    Worker(JoinError),
}
impl StdError for PipelineError {}
impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            PipelineError::Archive(e) => write!(f, "{e}"),
            PipelineError::ArticleStore(e) => write!(f, "{e}"),
            PipelineError::Checkpoint(e) => write!(f, "{e}"),
            PipelineError::BatchSubmit(e) => write!(f, "{e}"),
            PipelineError::Download(e) => write!(f, "{e}"),
            PipelineError::Normalizer(e) => write!(f, "{e}"),
            PipelineError::Worker(e) => write!(f, "PipelineError::Worker {e}"),
        }
    }
}
impl From<WikiMarkupProcessingError> for PipelineError {
    fn from(value: WikiMarkupProcessingError) -> Self {
        Self::Normalizer(value)
    }
}
impl From<JoinError> for PipelineError {
    fn from(value: JoinError) -> Self {
        Self::Worker(value)
    }
}

#[derive(Debug)]
pub(crate) enum ArchiveReadError {
    Open(PathBuf, io::Error),
    Decode { offset: u64, cause: io::Error },
    Corrupt { offset: u64, reason: String },
}
impl StdError for ArchiveReadError {}
impl Display for ArchiveReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ArchiveReadError::Open(path, e) => {
                write!(f, "ArchiveReadError::Open {}: {e}", path.display())
            }
            ArchiveReadError::Decode { offset, cause } => {
                write!(f, "ArchiveReadError::Decode at byte {offset}: {cause}")
            }
            ArchiveReadError::Corrupt { offset, reason } => {
                write!(f, "ArchiveReadError::Corrupt at byte {offset}: {reason}")
            }
        }
    }
}
impl From<ArchiveReadError> for PipelineError {
    fn from(value: ArchiveReadError) -> Self {
        Self::Archive(value)
    }
}

#[derive(Debug)]
pub(crate) enum ArticleStoreError {
    Unwritable(PathBuf, io::Error),
    Unreadable(PathBuf, io::Error),
    Write(PathBuf, io::Error),
    Remove(PathBuf, io::Error),
}
impl StdError for ArticleStoreError {}
impl Display for ArticleStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ArticleStoreError::Unwritable(path, e) => {
                write!(f, "ArticleStoreError::Unwritable {}: {e}", path.display())
            }
            ArticleStoreError::Unreadable(path, e) => {
                write!(f, "ArticleStoreError::Unreadable {}: {e}", path.display())
            }
            ArticleStoreError::Write(path, e) => {
                write!(f, "ArticleStoreError::Write {}: {e}", path.display())
            }
            ArticleStoreError::Remove(path, e) => {
                write!(f, "ArticleStoreError::Remove {}: {e}", path.display())
            }
        }
    }
}
impl From<ArticleStoreError> for PipelineError {
    fn from(value: ArticleStoreError) -> Self {
        Self::ArticleStore(value)
    }
}

#[derive(Debug)]
pub(crate) enum CheckpointError {
    Read(PathBuf, io::Error),
    Parse(PathBuf, serde_json::Error),
    Write(PathBuf, io::Error),
    Serialize(serde_json::Error),
    FingerprintMismatch {
        path: PathBuf,
        expected: Fingerprint,
        found: Fingerprint,
    },
    CorpusChanged {
        path: PathBuf,
        batch: usize,
        expected: Option<String>,
        found: Option<String>,
    },
}
impl StdError for CheckpointError {}
impl Display for CheckpointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CheckpointError::Read(path, e) => {
                write!(f, "CheckpointError::Read {}: {e}", path.display())
            }
            CheckpointError::Parse(path, e) => {
                write!(f, "CheckpointError::Parse {}: {e}", path.display())
            }
            CheckpointError::Write(path, e) => {
                write!(f, "CheckpointError::Write {}: {e}", path.display())
            }
            CheckpointError::Serialize(e) => write!(f, "CheckpointError::Serialize {e}"),
            CheckpointError::FingerprintMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "CheckpointError::FingerprintMismatch {} was written for [{found}], current run is [{expected}]; pass --restart to discard it",
                path.display()
            ),
            CheckpointError::CorpusChanged {
                path,
                batch,
                expected,
                found,
            } => write!(
                f,
                "CheckpointError::CorpusChanged {} records batch {batch} ending at chunk {}, the articles now end it at {}; pass --restart to index them again",
                path.display(),
                expected.as_deref().unwrap_or("(none)"),
                found.as_deref().unwrap_or("(none)")
            ),
        }
    }
}
impl From<CheckpointError> for PipelineError {
    fn from(value: CheckpointError) -> Self {
        Self::Checkpoint(value)
    }
}

#[derive(Debug)]
pub(crate) enum SubmitError {
    Embedding(EmbeddingServiceError),
    Index(IndexError),
}
impl StdError for SubmitError {}
impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SubmitError::Embedding(e) => write!(f, "{e}"),
            SubmitError::Index(e) => write!(f, "{e}"),
        }
    }
}
impl From<EmbeddingServiceError> for SubmitError {
    fn from(value: EmbeddingServiceError) -> Self {
        Self::Embedding(value)
    }
}
impl From<IndexError> for SubmitError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

#[derive(Debug)]
pub(crate) struct BatchSubmitError {
    pub(crate) batch_index: usize,
    pub(crate) attempts: usize,
    pub(crate) cause: SubmitError,
}
impl StdError for BatchSubmitError {}
impl Display for BatchSubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "BatchSubmitError: batch {} failed after {} attempts: {}. Re-run to resume from batch {}.",
            self.batch_index, self.attempts, self.cause, self.batch_index
        )
    }
}
impl From<BatchSubmitError> for PipelineError {
    fn from(value: BatchSubmitError) -> Self {
        Self::BatchSubmit(value)
    }
}

#[derive(Debug)]
pub(crate) enum DownloadError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
    Io(PathBuf, io::Error),
}
impl StdError for DownloadError {}
impl Display for DownloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DownloadError::Request(e) => write!(f, "DownloadError::Request {e}"),
            DownloadError::Status(status) => write!(f, "DownloadError::Status {status}"),
            DownloadError::Io(path, e) => write!(f, "DownloadError::Io {}: {e}", path.display()),
        }
    }
}
impl From<reqwest::Error> for DownloadError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value)
    }
}
impl From<DownloadError> for PipelineError {
    fn from(value: DownloadError) -> Self {
        Self::Download(value)
    }
}
