use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::{
    fmt::Display,
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

use crate::ingest::pipeline::error::ArchiveReadError;

const READ_BUFFER_CAPACITY: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArchiveFormat {
    Bzip2,
    Gzip,
    Plain,
}

impl ArchiveFormat {
    pub(crate) fn detect(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("bz2") => ArchiveFormat::Bzip2,
            Some("gz") => ArchiveFormat::Gzip,
            _ => ArchiveFormat::Plain,
        }
    }
}

impl Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFormat::Bzip2 => write!(f, "bzip2"),
            ArchiveFormat::Gzip => write!(f, "gzip"),
            ArchiveFormat::Plain => write!(f, "plain xml"),
        }
    }
}

/// Decompresses a dump incrementally.
///
/// Pull-based through [`BufRead`]: every `fill_buf` hands out the next decoded
/// segment and an empty segment signals end of stream. Nothing seeks, so the
/// source may be a pipe.
pub(crate) struct ArchiveReader {
    format: ArchiveFormat,
    inner: Box<dyn BufRead + Send>,
}

impl ArchiveReader {
    pub(crate) fn open(path: &Path) -> Result<Self, ArchiveReadError> {
        let file = File::open(path).map_err(|e| ArchiveReadError::Open(path.to_path_buf(), e))?;
        Ok(Self::from_reader(file, ArchiveFormat::detect(path)))
    }

    pub(crate) fn from_reader<R: Read + Send + 'static>(reader: R, format: ArchiveFormat) -> Self {
        let inner: Box<dyn BufRead + Send> = match format {
            ArchiveFormat::Bzip2 => Box::new(BufReader::with_capacity(
                READ_BUFFER_CAPACITY,
                MultiBzDecoder::new(reader),
            )),
            ArchiveFormat::Gzip => Box::new(BufReader::with_capacity(
                READ_BUFFER_CAPACITY,
                MultiGzDecoder::new(reader),
            )),
            ArchiveFormat::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, reader)),
        };
        Self { format, inner }
    }

    pub(crate) fn format(&self) -> ArchiveFormat {
        self.format
    }
}

impl Read for ArchiveReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for ArchiveReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}
