//! @acp:module "Decorations"
//! @acp:summary "Per-tag highlight range accumulation and the presentation sink"
//! @acp:domain core
//! @acp:layer service
//!
//! Line, block and doc passes all add into the same [`TagRanges`]; one flush
//! hands every configured tag its complete list. Tags without ranges are
//! flushed too, with an empty list, so the sink can clear stale highlights.

use std::collections::{BTreeSet, HashMap};

use crate::document::{Document, Range};
use crate::extract::TagMatch;

/// @acp:summary "Receives the highlight ranges of one tag"
pub trait DecorationSink {
    fn apply_ranges(&mut self, tag: &str, ranges: &[Range]);
}

/// Sink that keeps the last ranges applied per tag.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    applied: HashMap<String, Vec<Range>>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self, tag: &str) -> &[Range] {
        self.applied.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.applied.keys().map(String::as_str)
    }

    /// Number of `apply_ranges` calls received
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl DecorationSink for MemorySink {
    fn apply_ranges(&mut self, tag: &str, ranges: &[Range]) {
        self.flushes += 1;
        self.applied.insert(tag.to_string(), ranges.to_vec());
    }
}

/// @acp:summary "Highlight ranges grouped by tag, deduplicated by offsets"
#[derive(Debug, Clone, Default)]
pub struct TagRanges {
    ranges: HashMap<String, BTreeSet<(usize, usize)>>,
}

impl TagRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a byte range; returns `false` when it was already present.
    pub fn add(&mut self, tag: &str, start: usize, end: usize) -> bool {
        self.ranges.entry(tag.to_string()).or_default().insert((start, end))
    }

    pub fn extend(&mut self, matches: &[TagMatch]) {
        for m in matches {
            self.add(&m.tag_name, m.start, m.end);
        }
    }

    /// Ranges of one tag, ordered by offset
    pub fn get(&self, tag: &str) -> Vec<(usize, usize)> {
        self.ranges
            .get(tag)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total number of ranges over all tags
    pub fn len(&self) -> usize {
        self.ranges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// @acp:summary "Hand every tag its ranges, then clear"
    ///
    /// `tags` lists the configured tags in order; each receives exactly one
    /// call, with an empty list when nothing matched.
    pub fn flush<'a>(
        &mut self,
        doc: &Document,
        tags: impl IntoIterator<Item = &'a str>,
        sink: &mut dyn DecorationSink,
    ) {
        for tag in tags {
            let ranges: Vec<Range> = self
                .ranges
                .get(tag)
                .map(|set| set.iter().map(|&(start, end)| doc.range(start, end)).collect())
                .unwrap_or_default();
            sink.apply_ranges(tag, &ranges);
        }
        self.clear();
    }
}
