//! @acp:module "Comment Span Locator"
//! @acp:summary "Finds the ranges of a text that lie inside comments"
//! @acp:domain core
//! @acp:layer service
//!
//! # Strategies
//!
//! Four independent strategies run over the same text and their output is unioned:
//!
//! 1. **Line**: each occurrence of a line delimiter opens a span running to the
//!    end of the physical line. Repeated delimiters (`////`) count once.
//! 2. **Block**: a start marker at line start or after whitespace runs to the
//!    first following end marker, or to the end of the document when
//!    unterminated.
//! 3. **Doc**: blocks opened by the doubled start marker (`/**`), for languages
//!    with documentation comments.
//! 4. **Embedded**: brace-wrapped block comments (`{/* ... */}`) in JSX dialects.
//!
//! Every span carries the *segments* that are matchable text: the text after
//! each delimiter for line comments, and each gutter-stripped physical line for
//! block comments. This is a lexical heuristic; string literals containing
//! comment-like sequences and nested block comments are not understood.

mod block;
mod line;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::LanguageCommentProfile;

/// @acp:summary "Which strategy produced a span"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Line,
    Block,
    Doc,
}

/// Byte range of matchable comment text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// @acp:summary "A range of text lexically inside a comment"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentSpan {
    pub start: usize,
    pub end: usize,
    pub kind: CommentKind,
    /// For line comments, one segment per delimiter occurrence on the line, in
    /// order. For block and doc comments, one segment per non-empty line.
    pub segments: Vec<Segment>,
}

impl CommentSpan {
    pub fn contains_range(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }
}

/// @acp:summary "Which strategies are enabled"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    /// Block and embedded comments
    pub multiline: bool,
    /// Documentation blocks, for languages that have them
    pub doc_comments: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            multiline: true,
            doc_comments: true,
        }
    }
}

/// @acp:summary "Comment span locator for one resolved language profile"
///
/// Built once per language change; the delimiter expression is compiled here
/// and never per scan.
#[derive(Debug, Clone)]
pub struct SpanLocator {
    profile: LanguageCommentProfile,
    options: LocateOptions,
    line_delimiter: Option<Regex>,
}

impl SpanLocator {
    pub fn new(profile: LanguageCommentProfile, options: LocateOptions) -> Self {
        let line_delimiter = line::delimiter_regex(&profile.line_delimiters);
        Self {
            profile,
            options,
            line_delimiter,
        }
    }

    pub fn profile(&self) -> &LanguageCommentProfile {
        &self.profile
    }

    /// Expression matching one run of line delimiters, when the language has any
    pub fn line_delimiter(&self) -> Option<&Regex> {
        self.line_delimiter.as_ref()
    }

    /// @acp:summary "Locate every comment span of a text"
    ///
    /// Output is sorted by start offset. Spans of the same kind never overlap;
    /// spans of different kinds may.
    pub fn locate(&self, text: &str) -> Vec<CommentSpan> {
        if self.profile.is_plain_text {
            return Vec::new();
        }

        let mut spans = Vec::new();

        let line_spans = match &self.line_delimiter {
            Some(re) => line::locate(text, re),
            None => Vec::new(),
        };

        if let Some(block) = &self.profile.block {
            let block_only = !self.profile.has_line_comments();
            let doc_start = block.doc_start().filter(|_| self.profile.supports_doc_comments);

            if self.options.multiline || block_only {
                spans.extend(block::locate_blocks(text, block, doc_start.as_deref(), &line_spans));
            }
            if let Some(doc_start) = doc_start.as_deref() {
                if self.options.multiline || self.options.doc_comments {
                    spans.extend(block::locate_docs(text, block, doc_start, &line_spans));
                }
            }
            if self.profile.supports_embedded && self.options.multiline {
                spans.extend(block::locate_embedded(text, block, doc_start.as_deref()));
            }
        }

        spans.extend(line_spans);
        union(spans)
    }
}

/// Deduplicate and drop same-kind spans contained in another span of that kind.
fn union(mut spans: Vec<CommentSpan>) -> Vec<CommentSpan> {
    spans.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(a.start.cmp(&b.start))
            .then(b.end.cmp(&a.end))
    });

    let mut kept: Vec<CommentSpan> = Vec::with_capacity(spans.len());
    let mut reach: Option<(CommentKind, usize)> = None;
    for span in spans {
        match reach {
            Some((kind, end)) if kind == span.kind && span.end <= end => continue,
            _ => {}
        }
        reach = Some((span.kind, span.end));
        kept.push(span);
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start).then(a.kind.cmp(&b.kind)));
    kept
}

/// Byte offset of the character after `pos`, or `text.len()`.
pub(crate) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}
