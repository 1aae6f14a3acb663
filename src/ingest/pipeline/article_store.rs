use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use super::{document::ArticleRecord, error::ArticleStoreError};

pub(crate) const ARTICLE_EXTENSION: &str = "txt";
const RESERVED_CHARACTERS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const WRITE_CHECK_FILE: &str = ".voyagedex-write-check";

/// Strips reserved filesystem characters, maps spaces to `_` and caps the result at `cap` chars.
pub(crate) fn sanitize_title(title: &str, cap: usize) -> String {
    title
        .trim()
        .chars()
        .filter(|c| !RESERVED_CHARACTERS.contains(c) && !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(cap)
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

pub(crate) fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claim {
    pub(crate) path: PathBuf,
    pub(crate) renamed: bool,
}

/// Flat directory of `<sanitized title>.txt` files.
///
/// File names are claimed by a single owner in page order. A title that
/// sanitizes to a name already claimed in this run gets the first free
/// `_2`, `_3`, ... suffix.
pub(crate) struct ArticleStore {
    directory: PathBuf,
    filename_cap: usize,
    claimed: HashSet<String>,
}

impl ArticleStore {
    /// Creates the directory when needed and checks that files can be written into it.
    pub(crate) fn open(directory: &Path, filename_cap: usize) -> Result<Self, ArticleStoreError> {
        fs::create_dir_all(directory)
            .map_err(|e| ArticleStoreError::Unwritable(directory.to_path_buf(), e))?;
        let check = directory.join(WRITE_CHECK_FILE);
        fs::write(&check, b"")
            .and_then(|_| fs::remove_file(&check))
            .map_err(|e| ArticleStoreError::Unwritable(directory.to_path_buf(), e))?;

        Ok(Self {
            directory: directory.to_path_buf(),
            filename_cap,
            claimed: HashSet::new(),
        })
    }

    pub(crate) fn directory(&self) -> &Path {
        &self.directory
    }

    /// `None` when nothing usable survives sanitizing.
    ///
    /// A claim stays spent for the rest of the run even if its page is later
    /// rejected or fails, so suffixes depend on page order alone.
    pub(crate) fn claim(&mut self, title: &str) -> Option<Claim> {
        let stem = sanitize_title(title, self.filename_cap);
        if stem.is_empty() {
            return None;
        }
        if self.claimed.insert(stem.clone()) {
            return Some(Claim {
                path: self.article_path(&stem),
                renamed: false,
            });
        }
        for n in 2.. {
            let suffix = format!("_{n}");
            let room = self.filename_cap.saturating_sub(suffix.chars().count());
            let candidate = format!("{}{suffix}", stem.chars().take(room).collect::<String>());
            if self.claimed.insert(candidate.clone()) {
                return Some(Claim {
                    path: self.article_path(&candidate),
                    renamed: true,
                });
            }
        }
        None
    }

    fn article_path(&self, stem: &str) -> PathBuf {
        self.directory.join(format!("{stem}.{ARTICLE_EXTENSION}"))
    }
}

pub(crate) fn write_article(path: &Path, plain_text: &str) -> Result<(), ArticleStoreError> {
    fs::write(path, plain_text).map_err(|e| ArticleStoreError::Write(path.to_path_buf(), e))
}

pub(crate) fn read_article(path: &Path) -> Result<ArticleRecord, ArticleStoreError> {
    let plain_text = fs::read_to_string(path)
        .map_err(|e| ArticleStoreError::Unreadable(path.to_path_buf(), e))?;
    Ok(ArticleRecord {
        title: title_from_path(path),
        plain_text,
        source_path: path.to_path_buf(),
    })
}

/// Article files sorted byte-wise by file name, which fixes the global chunk order.
pub(crate) fn list_articles(directory: &Path) -> Result<Vec<PathBuf>, ArticleStoreError> {
    let entries = fs::read_dir(directory)
        .map_err(|e| ArticleStoreError::Unreadable(directory.to_path_buf(), e))?;

    let mut articles = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| ArticleStoreError::Unreadable(directory.to_path_buf(), e))?;
        let path = entry.path();
        let is_article = path
            .extension()
            .is_some_and(|extension| extension == ARTICLE_EXTENSION);
        if is_article && path.is_file() {
            articles.push(path);
        }
    }
    articles.sort_by(|a, b| {
        a.file_name()
            .map(|name| name.as_encoded_bytes())
            .cmp(&b.file_name().map(|name| name.as_encoded_bytes()))
    });
    Ok(articles)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn titles_are_made_filesystem_safe() {
        assert_eq!(sanitize_title("New York City", 100), "New_York_City");
        assert_eq!(sanitize_title("AC/DC: \"Live\"?", 100), "ACDC_Live");
        assert_eq!(sanitize_title("..hidden", 100), "hidden");
        assert_eq!(sanitize_title("a".repeat(150).as_str(), 100).len(), 100);
        assert_eq!(sanitize_title("???", 100), "");
    }

    #[test]
    fn provenance_title_comes_from_the_file_stem() {
        assert_eq!(
            title_from_path(Path::new("/kb/New_York_City.txt")),
            "New York City"
        );
    }

    #[test]
    fn colliding_titles_get_numbered_suffixes() {
        let directory = tempfile::tempdir().unwrap();
        let mut store = ArticleStore::open(directory.path(), 100).unwrap();

        let first = store.claim("Foo/Bar").unwrap();
        let second = store.claim("FooBar").unwrap();
        let third = store.claim("Foo?Bar").unwrap();

        assert_eq!(first.path, directory.path().join("FooBar.txt"));
        assert!(!first.renamed);
        assert_eq!(second.path, directory.path().join("FooBar_2.txt"));
        assert!(second.renamed);
        assert_eq!(third.path, directory.path().join("FooBar_3.txt"));
    }

    #[test]
    fn suffixed_names_respect_the_cap() {
        let directory = tempfile::tempdir().unwrap();
        let mut store = ArticleStore::open(directory.path(), 10).unwrap();
        let long = "abcdefghijklmnop";
        store.claim(long).unwrap();
        let renamed = store.claim(long).unwrap();
        let stem = renamed.path.file_stem().unwrap().to_string_lossy().to_string();
        assert_eq!(stem, "abcdefgh_2");
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let directory = tempfile::tempdir().unwrap();
        let file = directory.path().join("not-a-directory");
        fs::write(&file, "x").unwrap();
        let result = ArticleStore::open(&file, 100);
        assert!(matches!(result, Err(ArticleStoreError::Unwritable(_, _))));
    }

    #[test]
    fn listing_is_sorted_and_ignores_other_files() {
        let directory = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "B.txt", "notes.md"] {
            fs::write(directory.path().join(name), "text").unwrap();
        }
        let names = list_articles(directory.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["B.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn written_article_reads_back() {
        let directory = tempfile::tempdir().unwrap();
        let mut store = ArticleStore::open(directory.path(), 100).unwrap();
        let claim = store.claim("Paris").unwrap();
        write_article(&claim.path, "Paris is the capital of France.").unwrap();
        let article = read_article(&claim.path).unwrap();
        assert_eq!(article.title, "Paris");
        assert_eq!(article.plain_text, "Paris is the capital of France.");
    }
}
