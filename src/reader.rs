//! Generic Buffered Reader
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

use crate::prelude::Error;

#[derive(Debug)]
pub enum BufferedReader {
    /// Readable file
    PlainFile(BufReader<File>),
    /// gzip compressed file
    #[cfg(feature = "flate2")]
    GzFile(BufReader<GzDecoder<File>>),
}

impl BufferedReader {
    /// Opens given file, gzip compressed files are decoded on the fly.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let f = File::open(path)?;

        if gzip {
            #[cfg(feature = "flate2")]
            {
                Ok(Self::GzFile(BufReader::new(GzDecoder::new(f))))
            }
            #[cfg(not(feature = "flate2"))]
            {
                drop(f);
                Err(Error::ParsingError(
                    crate::prelude::ParsingError::GzipNotSupported,
                ))
            }
        } else {
            Ok(Self::PlainFile(BufReader::new(f)))
        }
    }
}

impl Read for BufferedReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, std::io::Error> {
        match self {
            Self::PlainFile(h) => h.read(buf),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.read(buf),
        }
    }
}

impl BufRead for BufferedReader {
    fn fill_buf(&mut self) -> Result<&[u8], std::io::Error> {
        match self {
            Self::PlainFile(h) => h.fill_buf(),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.fill_buf(),
        }
    }
    fn consume(&mut self, s: usize) {
        match self {
            Self::PlainFile(h) => h.consume(s),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.consume(s),
        }
    }
}

/// Lines of a [BufRead]able content. Invalid UTF-8 sequences are replaced
/// (so only the affected line is degraded), I/O errors are reported.
pub(crate) struct LossyLines<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = Result<String, std::io::Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            },
            Err(e) => Some(Err(e)),
        }
    }
}

/// Iterates the lines of this content, see [LossyLines]
pub(crate) fn lossy_lines<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines {
        reader,
        buf: Vec::with_capacity(128),
    }
}
