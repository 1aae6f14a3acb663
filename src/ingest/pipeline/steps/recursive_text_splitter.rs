use crate::ingest::pipeline::document::{ArticleRecord, Chunk};

/// Section headings first, then paragraphs, lines, sentences, words and finally characters.
pub(crate) const DEFAULT_SEPARATORS: [&str; 8] =
    ["\n== ", "\n=== ", "\n==== ", "\n\n", "\n", ". ", " ", ""];

/// Splits text into chunks of at most `chunk_size` characters where consecutive
/// chunks share exactly `chunk_overlap` characters.
///
/// Text is first cut into pieces at the highest priority separator present, each
/// piece recursing to the next separator while it is longer than
/// `chunk_size - chunk_overlap`. Separators stay attached to the start of the
/// piece that follows them, so concatenating the pieces reproduces the input.
/// Pieces are then packed greedily; every chunk after the first starts with the
/// tail of its predecessor. All lengths count `char`s.
#[derive(Debug, Clone)]
pub(crate) struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterTextSplitter {
    /// `chunk_overlap` must be smaller than `chunk_size`; configuration validates this.
    pub(crate) fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: Option<Vec<String>>,
    ) -> Self {
        RecursiveCharacterTextSplitter {
            chunk_size,
            chunk_overlap,
            separators: separators.unwrap_or_else(|| {
                DEFAULT_SEPARATORS
                    .iter()
                    .map(|separator| separator.to_string())
                    .collect()
            }),
        }
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn piece_limit(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }

    fn split_text_with_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
        let mut results = Vec::new();
        let mut last = 0;

        for (start, _) in text.match_indices(separator) {
            if start > last {
                results.push(&text[last..start]);
                last = start;
            }
        }
        if last < text.len() {
            results.push(&text[last..]);
        }

        results
    }

    fn hard_split<'t>(text: &'t str, limit: usize, pieces: &mut Vec<&'t str>) {
        let mut start = 0;
        for (count, (index, _)) in text.char_indices().enumerate() {
            if count > 0 && count % limit == 0 {
                pieces.push(&text[start..index]);
                start = index;
            }
        }
        if start < text.len() {
            pieces.push(&text[start..]);
        }
    }

    fn recursive_split<'t>(&self, text: &'t str, separator_index: usize, pieces: &mut Vec<&'t str>) {
        let limit = self.piece_limit();
        if text.chars().count() <= limit {
            pieces.push(text);
            return;
        }

        let next = self.separators[separator_index.min(self.separators.len())..]
            .iter()
            .position(|separator| separator.is_empty() || text.contains(separator.as_str()))
            .map(|offset| separator_index + offset);

        let Some(index) = next else {
            Self::hard_split(text, limit, pieces);
            return;
        };

        let separator = &self.separators[index];
        if separator.is_empty() {
            Self::hard_split(text, 1, pieces);
            return;
        }

        for part in Self::split_text_with_separator(text, separator) {
            if part.chars().count() <= limit {
                pieces.push(part);
            } else {
                self.recursive_split(part, index + 1, pieces);
            }
        }
    }

    fn merge_pieces(&self, pieces: Vec<&str>) -> Vec<String> {
        let mut chunks = vec![];
        let mut current = String::new();
        let mut current_length = 0;
        let mut has_fresh_text = false;

        for piece in pieces {
            let piece_length = piece.chars().count();
            if has_fresh_text && current_length + piece_length > self.chunk_size {
                let tail_start = current
                    .char_indices()
                    .nth(current_length.saturating_sub(self.chunk_overlap))
                    .map_or(current.len(), |(index, _)| index);
                let tail = current[tail_start..].to_string();
                chunks.push(std::mem::replace(&mut current, tail));
                current_length = current_length.min(self.chunk_overlap);
                has_fresh_text = false;
            }
            current.push_str(piece);
            current_length += piece_length;
            has_fresh_text = true;
        }
        if has_fresh_text {
            chunks.push(current);
        }
        chunks
    }

    pub(crate) fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![];
        }
        let mut pieces = vec![];
        self.recursive_split(text, 0, &mut pieces);
        self.merge_pieces(pieces)
    }

    pub(crate) fn split_article(&self, article: &ArticleRecord) -> Vec<Chunk> {
        self.split_text(&article.plain_text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| Chunk {
                text,
                source_title: article.title.clone(),
                source_path: article.source_path.clone(),
                sequence_index,
            })
            .collect()
    }
}
