use std::{
    fmt::Display,
    fs::{self, File},
    io::Read,
    path::Path,
};

use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::ingest::pipeline::{article_store::list_articles, error::ArticleStoreError};

const REDIRECT_MARKER: &str = "#REDIRECT";
/// UTF-8 needs at most four bytes per character.
const MAX_BYTES_PER_CHAR: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SanitizeSummary {
    pub(crate) deleted: usize,
    pub(crate) kept: usize,
    pub(crate) unreadable: usize,
}

impl Display for SanitizeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} redirect stubs deleted, {} articles kept, {} unreadable",
            self.deleted, self.kept, self.unreadable
        )
    }
}

enum Outcome {
    Deleted,
    Kept,
    Unreadable,
}

/// Post-pass over the article store that removes redirect stubs.
pub(crate) struct CorpusSanitizer {
    prefix_chars: usize,
}

impl CorpusSanitizer {
    pub(crate) fn new(prefix_chars: usize) -> Self {
        Self { prefix_chars }
    }

    fn read_prefix(&self, path: &Path) -> Result<String, ArticleStoreError> {
        let mut bytes = Vec::with_capacity(self.prefix_chars * MAX_BYTES_PER_CHAR);
        File::open(path)
            .and_then(|file| {
                file.take((self.prefix_chars * MAX_BYTES_PER_CHAR) as u64)
                    .read_to_end(&mut bytes)
            })
            .map_err(|e| ArticleStoreError::Unreadable(path.to_path_buf(), e))?;
        Ok(String::from_utf8_lossy(&bytes)
            .chars()
            .take(self.prefix_chars)
            .collect())
    }

    pub(crate) fn is_redirect_stub(&self, prefix: &str) -> bool {
        prefix
            .trim_start()
            .to_uppercase()
            .starts_with(REDIRECT_MARKER)
    }

    fn sanitize_article(&self, path: &Path) -> Outcome {
        let prefix = match self.read_prefix(path) {
            Ok(prefix) => prefix,
            Err(e) => {
                log::warn!("{e}");
                return Outcome::Unreadable;
            }
        };
        if !self.is_redirect_stub(&prefix) {
            return Outcome::Kept;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Removed redirect stub {}", path.display());
                Outcome::Deleted
            }
            Err(e) => {
                log::warn!("{}", ArticleStoreError::Remove(path.to_path_buf(), e));
                Outcome::Unreadable
            }
        }
    }

    /// Fails only when the directory itself cannot be listed.
    pub(crate) fn sanitize(
        &self,
        directory: &Path,
        progress: &ProgressBar,
    ) -> Result<SanitizeSummary, ArticleStoreError> {
        let articles = list_articles(directory)?;
        progress.set_length(articles.len() as u64);
        progress.set_message("Sanitizing");

        let summary = articles
            .par_iter()
            .map(|path| {
                let outcome = self.sanitize_article(path);
                progress.inc(1);
                outcome
            })
            .fold(SanitizeSummary::default, |mut summary, outcome| {
                match outcome {
                    Outcome::Deleted => summary.deleted += 1,
                    Outcome::Kept => summary.kept += 1,
                    Outcome::Unreadable => summary.unreadable += 1,
                }
                summary
            })
            .reduce(SanitizeSummary::default, |a, b| SanitizeSummary {
                deleted: a.deleted + b.deleted,
                kept: a.kept + b.kept,
                unreadable: a.unreadable + b.unreadable,
            });

        progress.finish_with_message("Sanitized");
        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn store_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let directory = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(directory.path().join(name), text).unwrap();
        }
        directory
    }

    #[test]
    fn redirect_stubs_are_removed() {
        let directory = store_with(&[
            ("Paris.txt", "Paris is the capital of France."),
            ("Paree.txt", "#REDIRECT Paris"),
            ("Lutece.txt", "  #redirect [[Paris]]"),
        ]);
        let summary = CorpusSanitizer::new(100)
            .sanitize(directory.path(), &ProgressBar::hidden())
            .unwrap();

        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.kept, 1);
        assert!(directory.path().join("Paris.txt").exists());
        assert!(!directory.path().join("Paree.txt").exists());
        assert!(!directory.path().join("Lutece.txt").exists());
    }

    #[test]
    fn second_pass_changes_nothing() {
        let directory = store_with(&[
            ("Paris.txt", "Paris is the capital of France."),
            ("Paree.txt", "#Redirect Paris"),
        ]);
        let sanitizer = CorpusSanitizer::new(100);
        sanitizer
            .sanitize(directory.path(), &ProgressBar::hidden())
            .unwrap();
        let before = list_articles(directory.path()).unwrap();
        let second = sanitizer
            .sanitize(directory.path(), &ProgressBar::hidden())
            .unwrap();
        let after = list_articles(directory.path()).unwrap();

        assert_eq!(before, after);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.kept, 1);
    }

    #[test]
    fn only_the_prefix_is_inspected() {
        let text = format!("{}#REDIRECT late marker", "Prose. ".repeat(30));
        let directory = store_with(&[("Long.txt", text.as_str())]);
        let summary = CorpusSanitizer::new(100)
            .sanitize(directory.path(), &ProgressBar::hidden())
            .unwrap();
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.deleted, 0);
    }

    #[test]
    fn directories_named_like_articles_are_ignored() {
        let directory = store_with(&[("Paris.txt", "Paris prose.")]);
        fs::create_dir(directory.path().join("Folder.txt")).unwrap();
        let summary = CorpusSanitizer::new(100)
            .sanitize(directory.path(), &ProgressBar::hidden())
            .unwrap();
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.unreadable, 0);
    }

    #[test]
    fn vanished_file_counts_as_unreadable() {
        let sanitizer = CorpusSanitizer::new(100);
        assert!(matches!(
            sanitizer.sanitize_article(Path::new("/nonexistent/kb/Gone.txt")),
            Outcome::Unreadable
        ));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = CorpusSanitizer::new(100)
            .sanitize(Path::new("/nonexistent/kb"), &ProgressBar::hidden());
        assert!(result.is_err());
    }
}
