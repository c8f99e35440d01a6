//! Revision records and the JSON Lines source they are read from.
//!
//! The engine accepts any `IntoIterator<Item = Result<RevisionRecord,
//! SourceError>>`; [`JsonlSource`] is the one the CLI uses. It reads lazily,
//! one line per record, so arbitrarily large dumps stream in constant memory.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

/// One page revision, in stream order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionRecord {
    /// Page title at the time of the revision. Never empty.
    pub title: String,
    /// Raw markup. `None` or whitespace-only means the page was deleted.
    pub content: Option<Vec<u8>>,
    pub message: Option<String>,
    pub is_minor_edit: bool,
    pub author_name: String,
    pub author_email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl RevisionRecord {
    /// Whether this revision removes the page.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.content
            .as_deref()
            .is_none_or(|c| match std::str::from_utf8(c) {
                Ok(text) => text.trim().is_empty(),
                Err(_) => c.iter().all(u8::is_ascii_whitespace),
            })
    }
}

/// A record could not be read from the source.
#[derive(Debug)]
pub enum SourceError {
    /// Reading the underlying stream failed.
    Io {
        /// 1-based line number.
        line: usize,
        source: io::Error,
    },

    /// A line is not a valid revision record.
    Malformed {
        /// 1-based line number.
        line: usize,
        reason: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { line, source } => write!(f, "read error at line {line}: {source}"),
            Self::Malformed { line, reason } => {
                write!(f, "malformed revision at line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { .. } => None,
        }
    }
}

/// On-disk shape of one line.
#[derive(Deserialize)]
struct Line {
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    minor: bool,
    author_name: String,
    author_email: String,
    timestamp: i64,
}

/// Lazy reader over a JSON Lines revision dump.
///
/// Blank lines are ignored and do not count as records.
pub struct JsonlSource<R> {
    lines: io::Lines<R>,
    line: usize,
    skip: usize,
}

impl JsonlSource<BufReader<File>> {
    /// Open a dump file.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> JsonlSource<R> {
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            skip: 0,
        }
    }

    /// Start after the first `n` records. Skipped lines are not parsed.
    #[must_use]
    pub const fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    fn parse(&self, text: &str) -> Result<RevisionRecord, SourceError> {
        let malformed = |reason: String| SourceError::Malformed {
            line: self.line,
            reason,
        };
        let raw: Line = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        if raw.title.trim().is_empty() {
            return Err(malformed("empty title".to_owned()));
        }
        Ok(RevisionRecord {
            title: raw.title,
            content: raw.content.map(String::into_bytes),
            message: raw.message,
            is_minor_edit: raw.minor,
            author_name: raw.author_name,
            author_email: raw.author_email,
            timestamp: raw.timestamp,
        })
    }
}

impl<R: BufRead> Iterator for JsonlSource<R> {
    type Item = Result<RevisionRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(source) => {
                    return Some(Err(SourceError::Io {
                        line: self.line + 1,
                        source,
                    }));
                }
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }
            return Some(self.parse(&text));
        }
    }
}
