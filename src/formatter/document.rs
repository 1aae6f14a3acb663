use colored::Colorize;

use crate::ingest::RetrievalResult;

use super::Provenance;

const EXCERPT_CHARS: usize = 250;

pub(crate) trait TextFormatter {
    fn format_document(&self, rank: usize) -> String;
}

impl TextFormatter for RetrievalResult {
    fn format_document(&self, rank: usize) -> String {
        let provenance = Provenance::Wikivoyage(self.source_title.clone());
        let excerpt = self
            .excerpt
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let mut short = excerpt.chars().take(EXCERPT_CHARS).collect::<String>();
        if excerpt.chars().count() > EXCERPT_CHARS {
            short.push_str("...");
        }
        format!(
            "[{rank}] {} (score {:.3}) {}\n    {short}",
            provenance.title().bold(),
            self.score,
            provenance.url().blue()
        )
    }
}
