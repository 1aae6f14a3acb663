use std::fmt::Display;

use parse_wiki_text::Configuration;

use super::{
    parse::{process_to_article, Regexes},
    Normalize, Process, WikiMarkupProcessingError,
};
use crate::ingest::pipeline::document::RawPage;

pub(crate) const DEFAULT_EXCLUDED_PREFIXES: [&str; 15] = [
    "Template:",
    "File:",
    "Image:",
    "User:",
    "User talk:",
    "Talk:",
    "Wikivoyage:",
    "Wikipedia:",
    "MediaWiki:",
    "Module:",
    "Help:",
    "Category:",
    "Portal:",
    "Draft:",
    "Special:",
];

/// Why a page never becomes an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    ExcludedNamespace(String),
    EmptyMarkup,
    Redirect,
    EmptyText,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::ExcludedNamespace(prefix) => write!(f, "excluded namespace {prefix}"),
            Rejection::EmptyMarkup => write!(f, "empty markup"),
            Rejection::Redirect => write!(f, "redirect"),
            Rejection::EmptyText => write!(f, "no text after normalization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Normalized {
    Article(String),
    Rejected(Rejection),
}

pub(crate) struct WikiMarkupProcessor {
    configuration: Configuration,
    regexes: Regexes,
    excluded_prefixes: Vec<String>,
}

impl WikiMarkupProcessor {
    pub(crate) fn new(excluded_prefixes: Vec<String>) -> Result<Self, WikiMarkupProcessingError> {
        Ok(Self {
            configuration: Configuration::default(),
            regexes: Regexes::new()?,
            excluded_prefixes,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_default_exclusions() -> Result<Self, WikiMarkupProcessingError> {
        Self::new(
            DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        )
    }

    /// Cheap checks that do not require parsing the markup.
    pub(crate) fn classify(&self, page: &RawPage) -> Option<Rejection> {
        if let Some(prefix) = self
            .excluded_prefixes
            .iter()
            .find(|prefix| page.title.starts_with(prefix.as_str()))
        {
            return Some(Rejection::ExcludedNamespace(prefix.clone()));
        }
        if page.markup.trim().is_empty() {
            return Some(Rejection::EmptyMarkup);
        }
        if self.regexes.redirect.is_match(&page.markup) {
            return Some(Rejection::Redirect);
        }
        None
    }

}

impl Normalize for WikiMarkupProcessor {
    fn normalize(&self, page: &RawPage) -> Result<Normalized, WikiMarkupProcessingError> {
        if let Some(rejection) = self.classify(page) {
            return Ok(Normalized::Rejected(rejection));
        }
        let text = self.process(&page.markup)?;
        if text.trim().is_empty() {
            Ok(Normalized::Rejected(Rejection::EmptyText))
        } else {
            Ok(Normalized::Article(text))
        }
    }
}

impl Process for WikiMarkupProcessor {
    type E = WikiMarkupProcessingError;
    fn process(&self, markup: &str) -> Result<String, Self::E> {
        let parse = self.configuration.parse(markup).nodes;
        process_to_article(&parse, &self.regexes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn page(title: &str, markup: &str) -> RawPage {
        RawPage {
            title: title.to_string(),
            markup: markup.to_string(),
        }
    }

    #[test]
    fn article_is_normalized() {
        let processor = WikiMarkupProcessor::with_default_exclusions().unwrap();
        let normalized = processor
            .normalize(&page("Paris", "'''Paris''' is the capital of [[France]]."))
            .unwrap();
        assert_eq!(
            normalized,
            Normalized::Article(String::from("Paris is the capital of France."))
        );
    }

    #[test]
    fn namespaced_pages_are_rejected() {
        let processor = WikiMarkupProcessor::with_default_exclusions().unwrap();
        assert_eq!(
            processor.classify(&page("Template:Infobox", "{{{1}}}")),
            Some(Rejection::ExcludedNamespace(String::from("Template:")))
        );
        assert_eq!(
            processor.classify(&page("User talk:Someone", "hello")),
            Some(Rejection::ExcludedNamespace(String::from("User talk:")))
        );
    }

    #[test]
    fn redirects_and_empty_pages_are_rejected() {
        let processor = WikiMarkupProcessor::with_default_exclusions().unwrap();
        assert_eq!(
            processor.classify(&page("Paree", "#REDIRECT [[Paris]]")),
            Some(Rejection::Redirect)
        );
        assert_eq!(
            processor.classify(&page("Paree", "  #redirect [[Paris]]")),
            Some(Rejection::Redirect)
        );
        assert_eq!(
            processor.classify(&page("Blank", "  \n ")),
            Some(Rejection::EmptyMarkup)
        );
        assert_eq!(
            processor
                .normalize(&page("Only infobox", "{{Infobox|a=b}}"))
                .unwrap(),
            Normalized::Rejected(Rejection::EmptyText)
        );
    }

    #[test]
    fn custom_exclusions_replace_defaults() {
        let processor = WikiMarkupProcessor::new(vec![String::from("Paris")]).unwrap();
        assert!(processor.classify(&page("Template:X", "text")).is_none());
        assert!(processor.classify(&page("Paris", "text")).is_some());
    }
}
