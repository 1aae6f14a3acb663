use std::{
    fmt::Display,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ingest::pipeline::error::CheckpointError;

/// Everything that changes the batch partitioning or the stored vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Fingerprint {
    pub(crate) chunk_size: usize,
    pub(crate) chunk_overlap: usize,
    pub(crate) batch_size: usize,
    pub(crate) embed_model: String,
    pub(crate) collection: String,
    /// See [`corpus_digest`].
    pub(crate) corpus: String,
}

/// Hash of the article file names and sizes, in listing order.
pub(crate) fn corpus_digest(articles: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    for path in articles {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let size = fs::metadata(path)
            .map(|metadata| metadata.len().to_string())
            .unwrap_or_else(|_| String::from("-"));
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(size.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chunk size {}, overlap {}, batch size {}, model {}, collection {}, corpus {}",
            self.chunk_size,
            self.chunk_overlap,
            self.batch_size,
            self.embed_model,
            self.collection,
            self.corpus.get(..12).unwrap_or(&self.corpus)
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Progress {
    /// Batches `0..completed_batches` are in the store.
    pub(crate) completed_batches: usize,
    /// Id of the final chunk of batch `completed_batches - 1`.
    pub(crate) last_chunk_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Checkpoint {
    fingerprint: Fingerprint,
    #[serde(flatten)]
    progress: Progress,
}

/// Single writer for the indexing progress marker.
pub(crate) struct CheckpointStore {
    path: PathBuf,
    fingerprint: Fingerprint,
}

impl CheckpointStore {
    pub(crate) fn new(path: PathBuf, fingerprint: Fingerprint) -> Self {
        Self { path, fingerprint }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Progress recorded by earlier runs; `restart` discards it.
    pub(crate) fn load(&self, restart: bool) -> Result<Progress, CheckpointError> {
        if restart {
            return match fs::remove_file(&self.path) {
                Ok(()) => {
                    log::info!("Discarded checkpoint {}", self.path.display());
                    Ok(Progress::default())
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Progress::default()),
                Err(e) => Err(CheckpointError::Write(self.path.clone(), e)),
            };
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Progress::default()),
            Err(e) => return Err(CheckpointError::Read(self.path.clone(), e)),
        };
        let checkpoint: Checkpoint = serde_json::from_str(&contents)
            .map_err(|e| CheckpointError::Parse(self.path.clone(), e))?;

        if checkpoint.fingerprint != self.fingerprint {
            return Err(CheckpointError::FingerprintMismatch {
                path: self.path.clone(),
                expected: self.fingerprint.clone(),
                found: checkpoint.fingerprint,
            });
        }
        Ok(checkpoint.progress)
    }

    /// Written to a sibling temp file, synced, then renamed over the previous checkpoint.
    pub(crate) fn commit(&self, progress: &Progress) -> Result<(), CheckpointError> {
        let checkpoint = Checkpoint {
            fingerprint: self.fingerprint.clone(),
            progress: progress.clone(),
        };
        let contents =
            serde_json::to_vec_pretty(&checkpoint).map_err(CheckpointError::Serialize)?;

        let temporary = self.path.with_extension("tmp");
        let write = |path: &Path| -> io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(&contents)?;
            file.sync_all()
        };
        write(&temporary).map_err(|e| CheckpointError::Write(temporary.clone(), e))?;
        fs::rename(&temporary, &self.path)
            .map_err(|e| CheckpointError::Write(self.path.clone(), e))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if let Err(e) = File::open(parent).and_then(|directory| directory.sync_all()) {
                log::warn!("Could not sync {}: {e}", parent.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fingerprint() -> Fingerprint {
        Fingerprint {
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 512,
            embed_model: String::from("nomic-embed-text"),
            collection: String::from("wikivoyage"),
            corpus: corpus_digest(&[]),
        }
    }

    fn progress(completed_batches: usize, last_chunk_id: &str) -> Progress {
        Progress {
            completed_batches,
            last_chunk_id: Some(last_chunk_id.to_string()),
        }
    }

    #[test]
    fn missing_checkpoint_starts_from_zero() {
        let directory = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(directory.path().join("checkpoint.json"), fingerprint());
        assert_eq!(store.load(false).unwrap(), Progress::default());
    }

    #[test]
    fn committed_progress_is_loaded_back() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("checkpoint.json");
        let store = CheckpointStore::new(path.clone(), fingerprint());
        store.commit(&progress(3, "Lyon:2")).unwrap();
        store.commit(&progress(4, "Nice:0")).unwrap();

        assert_eq!(store.load(false).unwrap(), progress(4, "Nice:0"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn changed_parameters_are_rejected() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("checkpoint.json");
        CheckpointStore::new(path.clone(), fingerprint())
            .commit(&progress(7, "Rome:5"))
            .unwrap();

        let mut changed = fingerprint();
        changed.batch_size = 256;
        let store = CheckpointStore::new(path, changed);
        assert!(matches!(
            store.load(false),
            Err(CheckpointError::FingerprintMismatch { .. })
        ));
        assert_eq!(store.load(true).unwrap(), Progress::default());
        assert_eq!(store.load(false).unwrap(), Progress::default());
    }

    #[test]
    fn corpus_digest_follows_names_and_sizes() {
        let directory = tempfile::tempdir().unwrap();
        let paris = directory.path().join("Paris.txt");
        let rome = directory.path().join("Rome.txt");
        fs::write(&paris, "Paris is the capital of France.").unwrap();
        fs::write(&rome, "Rome is the capital of Italy.").unwrap();

        let both = corpus_digest(&[paris.clone(), rome.clone()]);
        assert_eq!(both, corpus_digest(&[paris.clone(), rome.clone()]));
        assert_ne!(both, corpus_digest(&[rome.clone()]));

        fs::write(&paris, "Paris is the capital of France. It is large.").unwrap();
        assert_ne!(both, corpus_digest(&[paris, rome]));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("checkpoint.json");
        fs::write(&path, "{not json").unwrap();
        let store = CheckpointStore::new(path, fingerprint());
        assert!(matches!(store.load(false), Err(CheckpointError::Parse(_, _))));
    }
}
