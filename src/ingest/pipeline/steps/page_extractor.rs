use quick_xml::{events::Event, Reader};
use std::{fmt::Display, io, io::BufRead, mem};

use crate::ingest::pipeline::{document::RawPage, error::ArchiveReadError};

/// Errors at one offset before the dump is considered corrupt rather than malformed.
const STALLED_ERROR_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractorState {
    Idle,
    InPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Page,
    Title,
    Text,
    Other,
}

impl From<&[u8]> for Tag {
    fn from(local_name: &[u8]) -> Self {
        match local_name {
            b"page" => Tag::Page,
            b"title" => Tag::Title,
            b"text" => Tag::Text,
            _ => Tag::Other,
        }
    }
}

enum Step {
    Open(Tag),
    Close(Tag),
    Empty(Tag),
    Consumed,
    Malformed(String),
    Eof,
    Fatal(io::Error),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExtractorStats {
    pub(crate) pages_seen: usize,
    pub(crate) pages_emitted: usize,
    pub(crate) pages_incomplete: usize,
    pub(crate) pages_malformed: usize,
    pub(crate) peak_buffered_bytes: usize,
}

impl Display for ExtractorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pages seen, {} emitted, {} missing title or text, {} malformed, peak page buffer {} bytes",
            self.pages_seen,
            self.pages_emitted,
            self.pages_incomplete,
            self.pages_malformed,
            self.peak_buffered_bytes
        )
    }
}

/// Streaming `Idle -> InPage -> Idle` state machine over a MediaWiki export.
///
/// Only the page currently open is buffered. Its title and text buffers are
/// handed out or dropped the moment `</page>` is processed, so peak memory
/// follows the largest single page and not the size of the dump.
pub(crate) struct PageExtractor<R: BufRead> {
    reader: Reader<R>,
    event_buffer: Vec<u8>,
    state: ExtractorState,
    field: Option<Field>,
    field_buffer: String,
    title: Option<String>,
    markup: Option<String>,
    page_is_malformed: bool,
    stalled_at: Option<(usize, usize)>,
    finished: bool,
    stats: ExtractorStats,
}

impl<R: BufRead> PageExtractor<R> {
    pub(crate) fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(false);
        reader.check_end_names(true);
        Self {
            reader,
            event_buffer: Vec::with_capacity(8192),
            state: ExtractorState::Idle,
            field: None,
            field_buffer: String::new(),
            title: None,
            markup: None,
            page_is_malformed: false,
            stalled_at: None,
            finished: false,
            stats: ExtractorStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> ExtractorStats {
        self.stats
    }

    fn read_step(&mut self) -> Step {
        self.event_buffer.clear();
        match self.reader.read_event_into(&mut self.event_buffer) {
            Ok(Event::Start(e)) => Step::Open(Tag::from(e.local_name().as_ref())),
            Ok(Event::End(e)) => Step::Close(Tag::from(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => Step::Empty(Tag::from(e.local_name().as_ref())),
            Ok(Event::Text(e)) => match self.field {
                Some(_) => match e.unescape() {
                    Ok(text) => {
                        self.field_buffer.push_str(&text);
                        Step::Consumed
                    }
                    Err(e) => Step::Malformed(e.to_string()),
                },
                None => Step::Consumed,
            },
            Ok(Event::CData(e)) => match self.field {
                Some(_) => match std::str::from_utf8(&e.into_inner()) {
                    Ok(text) => {
                        self.field_buffer.push_str(text);
                        Step::Consumed
                    }
                    Err(e) => Step::Malformed(e.to_string()),
                },
                None => Step::Consumed,
            },
            Ok(Event::Eof) => Step::Eof,
            Ok(_) => Step::Consumed,
            Err(quick_xml::Error::Io(e)) => Step::Fatal(io::Error::new(e.kind(), e.to_string())),
            Err(e) => Step::Malformed(e.to_string()),
        }
    }

    fn offset(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn reset_page(&mut self) {
        self.field = None;
        self.field_buffer = String::new();
        self.title = None;
        self.markup = None;
        self.page_is_malformed = false;
    }

    fn record_buffer_usage(&mut self) {
        let buffered = self.field_buffer.len()
            + self.title.as_ref().map_or(0, String::len)
            + self.markup.as_ref().map_or(0, String::len)
            + self.event_buffer.capacity();
        self.stats.peak_buffered_bytes = self.stats.peak_buffered_bytes.max(buffered);
    }

    fn open(&mut self, tag: Tag) {
        match (self.state, tag) {
            (ExtractorState::InPage, Tag::Page) => {
                // a page opened inside a page: the outer one never closed properly
                self.stats.pages_malformed += 1;
                self.reset_page();
                self.stats.pages_seen += 1;
            }
            (ExtractorState::Idle, Tag::Page) => {
                self.state = ExtractorState::InPage;
                self.reset_page();
                self.stats.pages_seen += 1;
            }
            (ExtractorState::InPage, Tag::Title) => {
                self.field = Some(Field::Title);
                self.field_buffer.clear();
            }
            (ExtractorState::InPage, Tag::Text) => {
                self.field = Some(Field::Text);
                self.field_buffer.clear();
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: Tag) -> Option<RawPage> {
        if self.state != ExtractorState::InPage {
            return None;
        }
        match tag {
            Tag::Title if self.field == Some(Field::Title) => {
                self.title = Some(mem::take(&mut self.field_buffer));
                self.field = None;
                None
            }
            Tag::Text if self.field == Some(Field::Text) => {
                self.markup = Some(mem::take(&mut self.field_buffer));
                self.field = None;
                None
            }
            Tag::Page => {
                self.record_buffer_usage();
                let title = self.title.take();
                let markup = self.markup.take();
                let malformed = self.page_is_malformed;
                self.reset_page();
                self.state = ExtractorState::Idle;

                match (malformed, title, markup) {
                    (true, _, _) => {
                        self.stats.pages_malformed += 1;
                        None
                    }
                    (false, Some(title), Some(markup)) if !title.trim().is_empty() => {
                        self.stats.pages_emitted += 1;
                        Some(RawPage { title, markup })
                    }
                    _ => {
                        self.stats.pages_incomplete += 1;
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn empty(&mut self, tag: Tag) {
        if self.state != ExtractorState::InPage {
            return;
        }
        match tag {
            Tag::Title => self.title = Some(String::new()),
            Tag::Text => self.markup = Some(String::new()),
            _ => {}
        }
    }

    fn malformed(&mut self, reason: String) -> Option<ArchiveReadError> {
        let position = self.reader.buffer_position();
        let repeats = match self.stalled_at {
            Some((stalled_position, repeats)) if stalled_position == position => repeats + 1,
            _ => 1,
        };
        self.stalled_at = Some((position, repeats));
        if repeats >= STALLED_ERROR_LIMIT {
            return Some(ArchiveReadError::Corrupt {
                offset: position as u64,
                reason,
            });
        }

        match self.state {
            ExtractorState::InPage => {
                log::debug!("Skipping malformed page at byte {position}: {reason}");
                self.page_is_malformed = true;
            }
            ExtractorState::Idle => {
                log::debug!("Ignoring malformed markup between pages at byte {position}: {reason}")
            }
        }
        None
    }
}

impl<R: BufRead> Iterator for PageExtractor<R> {
    type Item = Result<RawPage, ArchiveReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let step = self.read_step();
            if !matches!(step, Step::Malformed(_)) {
                self.stalled_at = None;
            }
            match step {
                Step::Open(tag) => self.open(tag),
                Step::Close(tag) => {
                    if let Some(page) = self.close(tag) {
                        return Some(Ok(page));
                    }
                }
                Step::Empty(tag) => self.empty(tag),
                Step::Consumed => {}
                Step::Malformed(reason) => {
                    if let Some(error) = self.malformed(reason) {
                        self.finished = true;
                        return Some(Err(error));
                    }
                }
                Step::Eof => {
                    if self.state == ExtractorState::InPage {
                        self.stats.pages_incomplete += 1;
                        self.reset_page();
                        self.state = ExtractorState::Idle;
                    }
                    self.finished = true;
                    return None;
                }
                Step::Fatal(cause) => {
                    self.finished = true;
                    return Some(Err(ArchiveReadError::Decode {
                        offset: self.offset(),
                        cause,
                    }));
                }
            }
            self.record_buffer_usage();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{dump_xml, page_xml, TWO_PAGE_DUMP};

    fn extract(xml: &str) -> (Vec<RawPage>, ExtractorStats) {
        let mut extractor = PageExtractor::new(xml.as_bytes());
        let pages = extractor
            .by_ref()
            .collect::<Result<Vec<_>, _>>()
            .expect("no fatal errors");
        (pages, extractor.stats())
    }

    #[test]
    fn emits_one_page_per_complete_page_element() {
        let (pages, stats) = extract(TWO_PAGE_DUMP);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Paris");
        assert!(pages[0].markup.contains("'''Paris''' is the capital"));
        assert_eq!(pages[1].title, "Template:Infobox");
        assert_eq!(stats.pages_seen, 2);
        assert_eq!(stats.pages_emitted, 2);
    }

    #[test]
    fn repeated_and_reordered_pages_are_all_emitted() {
        let pages = [
            page_xml("Lyon", "Lyon text"),
            page_xml("Nice", "Nice text"),
            page_xml("Lyon", "Lyon text"),
        ];
        let (forward, _) = extract(&dump_xml(&pages));
        let reversed = pages.iter().rev().cloned().collect::<Vec<_>>();
        let (backward, _) = extract(&dump_xml(&reversed));

        assert_eq!(forward.len(), 3);
        assert_eq!(backward.len(), 3);
        assert_eq!(
            forward.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            ["Lyon", "Nice", "Lyon"]
        );
        assert_eq!(
            backward.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            ["Lyon", "Nice", "Lyon"]
        );
    }

    #[test]
    fn unescapes_xml_entities_in_text() {
        let (pages, _) = extract(&dump_xml(&[page_xml(
            "Rome",
            "Rome &amp; Vatican &lt;ref&gt;x&lt;/ref&gt;",
        )]));
        assert_eq!(pages[0].markup, "Rome & Vatican <ref>x</ref>");
    }

    #[test]
    fn page_missing_text_is_dropped_silently() {
        let xml = dump_xml(&[
            String::from("<page><title>No Text</title><ns>0</ns></page>"),
            page_xml("Berlin", "Berlin text"),
        ]);
        let (pages, stats) = extract(&xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Berlin");
        assert_eq!(stats.pages_incomplete, 1);
        assert_eq!(stats.pages_malformed, 0);
    }

    #[test]
    fn empty_text_element_is_emitted_with_empty_markup() {
        let xml = dump_xml(&[String::from(
            "<page><title>Blank</title><revision><text /></revision></page>",
        )]);
        let (pages, _) = extract(&xml);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].markup.is_empty());
    }

    #[test]
    fn malformed_page_is_skipped_and_counted() {
        let xml = dump_xml(&[
            page_xml("Madrid", "Madrid text"),
            String::from("<page><title>Broken</titl><revision><text>x</text></revision></page>"),
            String::from("<page><title>Entity</title><revision><text>&bogus;</text></revision></page>"),
            page_xml("Lisbon", "Lisbon text"),
        ]);
        let (pages, stats) = extract(&xml);
        assert_eq!(
            pages.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            ["Madrid", "Lisbon"]
        );
        assert_eq!(stats.pages_malformed, 2);
    }

    #[test]
    fn errors_without_progress_become_corrupt() {
        let mut extractor = PageExtractor::new("<mediawiki>".as_bytes());
        for _ in 1..STALLED_ERROR_LIMIT {
            assert!(extractor.malformed(String::from("stuck")).is_none());
        }
        match extractor.malformed(String::from("stuck")) {
            Some(ArchiveReadError::Corrupt { offset, reason }) => {
                assert_eq!(offset, 0);
                assert_eq!(reason, "stuck");
            }
            other => panic!("expected a corrupt archive, got {other:?}"),
        }
    }

    #[test]
    fn namespace_prefixed_elements_are_matched_by_local_name() {
        let xml = r#"<?xml version="1.0"?>
<mw:mediawiki xmlns:mw="http://www.mediawiki.org/xml/export-0.11/">
  <mw:page><mw:title>Oslo</mw:title><mw:revision><mw:text>Oslo text</mw:text></mw:revision></mw:page>
</mw:mediawiki>"#;
        let (pages, _) = extract(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Oslo");
        assert_eq!(pages[0].markup, "Oslo text");
    }

    #[test]
    fn truncated_final_page_is_not_emitted() {
        let xml = format!(
            "<mediawiki>{}<page><title>Cut</title><revision><text>partial",
            page_xml("Vienna", "Vienna text")
        );
        let mut extractor = PageExtractor::new(xml.as_bytes());
        let mut titles = vec![];
        for page in extractor.by_ref() {
            if let Ok(page) = page {
                titles.push(page.title);
            }
        }
        assert_eq!(titles, ["Vienna"]);
    }

    #[test]
    fn peak_buffer_does_not_grow_with_page_count() {
        let text = "Prose about a destination. ".repeat(40);
        let pages = |count: usize| {
            (0..count)
                .map(|n| page_xml(&format!("Place {n:04}"), &text))
                .collect::<Vec<_>>()
        };
        let (small, small_stats) = extract(&dump_xml(&pages(100)));
        let (large, large_stats) = extract(&dump_xml(&pages(200)));

        assert_eq!(small.len(), 100);
        assert_eq!(large.len(), 200);
        assert!(small_stats.peak_buffered_bytes > 0);
        assert_eq!(
            small_stats.peak_buffered_bytes,
            large_stats.peak_buffered_bytes
        );
    }

    #[test]
    fn io_failure_is_fatal() {
        struct FailingReader;
        impl io::Read for FailingReader {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt block"))
            }
        }
        let mut extractor = PageExtractor::new(io::BufReader::new(FailingReader));
        assert!(matches!(
            extractor.next(),
            Some(Err(ArchiveReadError::Decode { .. }))
        ));
        assert!(extractor.next().is_none());
    }
}
