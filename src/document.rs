//! @acp:module "Document"
//! @acp:summary "Owned document text with a line index for offset/position translation"
//! @acp:domain core
//! @acp:layer model
//!
//! Offsets are UTF-8 byte offsets into the text. `Position::character` counts
//! Unicode scalar values from the start of the line.

use serde::{Deserialize, Serialize};

/// @acp:summary "Zero-based line/character pair"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// @acp:summary "Start/end position pair"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// A physical line of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    /// Line text without its terminator
    pub text: &'a str,
    /// Byte offset of the line start
    pub offset: usize,
}

/// @acp:summary "Identity of a document snapshot"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub uri: String,
    pub version: u64,
}

/// @acp:summary "A text document as handed over by the host"
#[derive(Debug, Clone)]
pub struct Document {
    uri: String,
    language_id: String,
    version: u64,
    text: String,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_version(uri, language_id, 0, text)
    }

    pub fn with_version(
        uri: impl Into<String>,
        language_id: impl Into<String>,
        version: u64,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version,
            text,
            line_starts,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            uri: self.uri.clone(),
            version: self.version,
        }
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// @acp:summary "Line by number; the last line when out of range"
    pub fn line_at(&self, line: usize) -> Line<'_> {
        let number = line.min(self.line_starts.len() - 1);
        let offset = self.line_starts[number];
        let end = self
            .line_starts
            .get(number + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let text = self.text[offset..end].trim_end_matches('\r');
        Line { number, text, offset }
    }

    /// Line containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// @acp:summary "Translate a byte offset into a line/character position"
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = floor_char_boundary(&self.text, offset.min(self.text.len()));
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        Position {
            line,
            character: self.text[start..offset].chars().count(),
        }
    }

    pub fn range(&self, start: usize, end: usize) -> Range {
        Range {
            start: self.position_at(start),
            end: self.position_at(end),
        }
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
