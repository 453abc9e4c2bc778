//! @acp:module "Engine"
//! @acp:summary "Decoration pipeline for the active document"
//! @acp:domain core
//! @acp:layer service
//!
//! # Lifecycle
//!
//! 1. [`Engine::configure`] compiles the tag table (once per configuration change).
//! 2. [`Engine::open`] or [`Engine::set_language`] resolves the language and builds a matcher.
//! 3. [`Engine::on_change`] records edits; [`Engine::poll`] releases documents whose
//!    debounce window elapsed.
//! 4. [`Engine::scan`] accumulates matches; [`Engine::apply_decorations`] flushes them.
//!
//! A scan may be split into [`Engine::begin_scan`] and [`Engine::finish_scan`] when
//! matching runs elsewhere. While a scan is in flight, edits to the same document
//! are not scheduled for decoration; they only queue an index refresh. A scan
//! whose document identity changed meanwhile is dropped on completion.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::decorate::{DecorationSink, TagRanges};
use crate::document::{Document, DocumentKey};
use crate::extract::{Matcher, TagMatch};
use crate::language::ProfileResolver;
use crate::schedule::{IndexQueue, ScanScheduler};
use crate::span::LocateOptions;
use crate::tags::TagSet;

/// Why a scan did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    UnsupportedLanguage,
    NoTags,
    /// A scan is already in flight
    Reentrant,
}

/// @acp:summary "Outcome of one scan"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Matches were accumulated for the next flush
    Accumulated { matches: usize },
    /// The document changed while scanning; the result was dropped
    Stale,
    Skipped(SkipReason),
}

/// What happened to a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDisposition {
    /// Scheduled for a debounced decoration scan
    Scheduled,
    /// A scan was in flight; only an index refresh was queued
    Deferred,
}

/// @acp:summary "Captured state of a scan in flight"
#[derive(Debug, Clone)]
pub struct ScanTicket {
    key: DocumentKey,
    matcher: Matcher,
}

impl ScanTicket {
    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn run(&self, doc: &Document) -> Vec<TagMatch> {
        self.matcher.find_matches(doc)
    }
}

/// @acp:summary "Comment tag decoration engine"
pub struct Engine {
    enabled: bool,
    options: LocateOptions,
    resolver: ProfileResolver,
    tags: Arc<TagSet>,
    language_id: Option<String>,
    matcher: Option<Matcher>,
    ranges: TagRanges,
    matches: Vec<TagMatch>,
    scanning: Option<DocumentKey>,
    current: Option<DocumentKey>,
    warned_empty: bool,
    scheduler: ScanScheduler<String>,
    index_queue: IndexQueue<String>,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        let mut engine = Self {
            enabled: config.enabled,
            options: config.locate_options(),
            resolver: config.resolver(),
            tags: Arc::new(TagSet::default()),
            language_id: None,
            matcher: None,
            ranges: TagRanges::new(),
            matches: Vec::new(),
            scanning: None,
            current: None,
            warned_empty: false,
            scheduler: ScanScheduler::new(config.debounce()),
            index_queue: IndexQueue::new(config.index_delay()),
        };
        engine.configure(config);
        engine
    }

    /// @acp:summary "Rebuild the tag table and matcher from configuration"
    pub fn configure(&mut self, config: &Config) {
        self.enabled = config.enabled;
        self.options = config.locate_options();
        self.resolver = config.resolver();
        self.tags = Arc::new(TagSet::compile(&config.tags));
        self.scheduler.set_window(config.debounce());
        self.index_queue.set_delay(config.index_delay());

        if self.tags.is_empty() {
            if !self.warned_empty {
                tracing::warn!("No usable tags configured; nothing will be highlighted");
                self.warned_empty = true;
            }
        } else {
            self.warned_empty = false;
        }

        if let Some(language_id) = self.language_id.take() {
            self.set_language(&language_id);
        }
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    /// @acp:summary "Resolve a language and build its matcher"
    ///
    /// Returns whether the language is supported. An unsupported language is
    /// a normal state in which every scan is skipped.
    pub fn set_language(&mut self, language_id: &str) -> bool {
        if self.language_id.as_deref() == Some(language_id) && self.matcher.is_some() {
            return true;
        }

        self.language_id = Some(language_id.to_string());
        self.matcher = self
            .resolver
            .resolve(language_id)
            .map(|profile| Matcher::new(profile, self.options, Arc::clone(&self.tags)));

        if self.matcher.is_none() {
            tracing::debug!("Language {} is not supported", language_id);
        }
        self.matcher.is_some()
    }

    pub fn is_supported(&self) -> bool {
        self.matcher.is_some()
    }

    /// Make `doc` the current document
    pub fn open(&mut self, doc: &Document) -> bool {
        self.current = Some(doc.key());
        self.ranges.clear();
        self.set_language(doc.language_id())
    }

    pub fn current(&self) -> Option<&DocumentKey> {
        self.current.as_ref()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.is_some()
    }

    /// @acp:summary "Record an edit to a document"
    ///
    /// Every change queues an index refresh. The decoration scan is only
    /// scheduled when no scan of the same document is in flight.
    pub fn on_change(&mut self, key: DocumentKey, now: Instant) -> ChangeDisposition {
        self.index_queue.push(key.uri.clone(), now);

        let in_flight = self.scanning.as_ref().is_some_and(|k| k.uri == key.uri);
        if self.current.as_ref().map_or(true, |k| k.uri == key.uri) {
            self.current = Some(key.clone());
        }

        if in_flight {
            tracing::debug!("Scan of {} in flight; change queued for indexing only", key.uri);
            return ChangeDisposition::Deferred;
        }
        self.scheduler.notify_change(key.uri, now);
        ChangeDisposition::Scheduled
    }

    /// Documents whose debounce window elapsed
    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        self.scheduler.due(now)
    }

    /// Documents whose index refresh is due
    pub fn drain_index_queue(&mut self, now: Instant) -> Vec<String> {
        self.index_queue.drain(now)
    }

    /// @acp:summary "Start a scan, capturing the document identity"
    pub fn begin_scan(&mut self, doc: &Document) -> Result<ScanTicket, SkipReason> {
        if !self.enabled {
            return Err(SkipReason::Disabled);
        }
        if self.scanning.is_some() {
            return Err(SkipReason::Reentrant);
        }
        if self.tags.is_empty() {
            return Err(SkipReason::NoTags);
        }
        let matcher = self.matcher.clone().ok_or(SkipReason::UnsupportedLanguage)?;

        let key = doc.key();
        self.scanning = Some(key.clone());
        Ok(ScanTicket { key, matcher })
    }

    /// @acp:summary "Complete a scan; stale results are dropped"
    pub fn finish_scan(&mut self, ticket: ScanTicket, matches: Vec<TagMatch>) -> ScanStatus {
        self.scanning = None;

        if self.current.as_ref() != Some(&ticket.key) {
            tracing::debug!(
                "Dropping stale scan of {} v{}",
                ticket.key.uri,
                ticket.key.version
            );
            return ScanStatus::Stale;
        }

        self.ranges.extend(&matches);
        let count = matches.len();
        self.matches = matches;
        ScanStatus::Accumulated { matches: count }
    }

    /// @acp:summary "Scan a document synchronously"
    pub fn scan(&mut self, doc: &Document) -> ScanStatus {
        if self.current.is_none() {
            self.open(doc);
        }
        match self.begin_scan(doc) {
            Ok(ticket) => {
                let matches = ticket.run(doc);
                self.finish_scan(ticket, matches)
            }
            Err(reason) => ScanStatus::Skipped(reason),
        }
    }

    /// Matches of the last accepted scan
    pub fn matches(&self) -> &[TagMatch] {
        &self.matches
    }

    /// @acp:summary "Flush accumulated ranges for every configured tag, then clear"
    pub fn apply_decorations(&mut self, doc: &Document, sink: &mut dyn DecorationSink) {
        let tags = Arc::clone(&self.tags);
        self.ranges.flush(doc, tags.names(), sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::MemorySink;
    use crate::tags::TagConfig;
    use std::time::Duration;

    fn doc(version: u64, text: &str) -> Document {
        Document::with_version("file:///a.ts", "typescript", version, text)
    }

    #[test]
    fn test_scan_and_apply() {
        let mut engine = Engine::new(&Config::default());
        let d = doc(1, "// TODO: a\n/* FIXME: b */\n");
        engine.open(&d);

        assert_eq!(engine.scan(&d), ScanStatus::Accumulated { matches: 2 });

        let mut sink = MemorySink::new();
        engine.apply_decorations(&d, &mut sink);
        assert_eq!(sink.ranges("TODO").len(), 1);
        assert_eq!(sink.ranges("FIXME").len(), 1);
        assert!(sink.ranges("BUG").is_empty());
        assert_eq!(sink.flushes(), 17);
    }

    #[test]
    fn test_apply_clears_so_rescans_do_not_duplicate() {
        let mut engine = Engine::new(&Config::default());
        let d = doc(1, "// TODO: a\n");
        engine.open(&d);

        let mut sink = MemorySink::new();
        for _ in 0..3 {
            engine.scan(&d);
            engine.apply_decorations(&d, &mut sink);
        }
        assert_eq!(sink.ranges("TODO").len(), 1);
    }

    #[test]
    fn test_unsupported_language_skips() {
        let mut engine = Engine::new(&Config::default());
        let d = Document::new("x.bin", "no-such-language", "// TODO");
        assert!(!engine.open(&d));
        assert_eq!(engine.scan(&d), ScanStatus::Skipped(SkipReason::UnsupportedLanguage));
    }

    #[test]
    fn test_disabled_skips() {
        let config = Config {
            enabled: false,
            ..Config::default()
        };
        let mut engine = Engine::new(&config);
        let d = doc(1, "// TODO");
        engine.open(&d);
        assert_eq!(engine.scan(&d), ScanStatus::Skipped(SkipReason::Disabled));
    }

    #[test]
    fn test_empty_tag_table() {
        let config = Config {
            tags: vec![TagConfig::new("BAD").with_pattern("(")],
            ..Config::default()
        };
        let mut engine = Engine::new(&config);
        let d = doc(1, "// TODO");
        engine.open(&d);
        assert!(engine.tags().is_empty());
        assert_eq!(engine.scan(&d), ScanStatus::Skipped(SkipReason::NoTags));
    }

    #[test]
    fn test_stale_scan_is_dropped() {
        let mut engine = Engine::new(&Config::default());
        let v1 = doc(1, "// TODO: a\n");
        engine.open(&v1);

        let ticket = engine.begin_scan(&v1).unwrap();
        let matches = ticket.run(&v1);

        let t0 = Instant::now();
        let v2 = doc(2, "// TODO: a\n// NOTE: b\n");
        assert_eq!(engine.on_change(v2.key(), t0), ChangeDisposition::Deferred);

        assert_eq!(engine.finish_scan(ticket, matches), ScanStatus::Stale);
        assert!(!engine.is_scanning());

        let mut sink = MemorySink::new();
        engine.apply_decorations(&v2, &mut sink);
        assert!(sink.ranges("TODO").is_empty());
    }

    #[test]
    fn test_reentrant_scan_is_refused_and_change_queued_for_index() {
        let mut engine = Engine::new(&Config::default());
        let d = doc(1, "// TODO\n");
        engine.open(&d);

        let ticket = engine.begin_scan(&d).unwrap();
        assert_eq!(engine.begin_scan(&d).unwrap_err(), SkipReason::Reentrant);

        let t0 = Instant::now();
        assert_eq!(engine.on_change(d.key(), t0), ChangeDisposition::Deferred);
        assert!(engine.poll(t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(engine.drain_index_queue(t0 + Duration::from_secs(1)), vec!["file:///a.ts"]);

        let matches = ticket.run(&d);
        assert_eq!(engine.finish_scan(ticket, matches), ScanStatus::Accumulated { matches: 1 });
    }

    #[test]
    fn test_changes_are_debounced() {
        let mut engine = Engine::new(&Config::default());
        let t0 = Instant::now();
        for (i, offset) in [0u64, 30, 60, 90].iter().enumerate() {
            let key = doc(i as u64, "").key();
            assert_eq!(
                engine.on_change(key, t0 + Duration::from_millis(*offset)),
                ChangeDisposition::Scheduled
            );
        }
        assert!(engine.poll(t0 + Duration::from_millis(150)).is_empty());
        assert_eq!(engine.poll(t0 + Duration::from_millis(190)), vec!["file:///a.ts"]);
        assert_eq!(engine.current().map(|k| k.version), Some(3));
    }

    #[test]
    fn test_reconfigure_rebuilds_matcher() {
        let mut engine = Engine::new(&Config::default());
        let d = doc(1, "// SECURITY: check input\n");
        engine.open(&d);
        engine.scan(&d);
        assert!(engine.matches().iter().all(|m| m.tag_name != "SECURITY"));

        let config = Config {
            tags: vec![TagConfig::new("SECURITY")],
            ..Config::default()
        };
        engine.configure(&config);
        assert!(engine.is_supported());
        assert_eq!(engine.scan(&d), ScanStatus::Accumulated { matches: 1 });
        assert_eq!(engine.matches()[0].tag_name, "SECURITY");
    }

    #[test]
    fn test_reconfigure_keeps_pending_changes() {
        let mut engine = Engine::new(&Config::default());
        let t0 = Instant::now();
        engine.on_change(doc(1, "// TODO\n").key(), t0);

        engine.configure(&Config {
            debounce_ms: 300,
            ..Config::default()
        });
        assert!(engine.poll(t0 + Duration::from_millis(200)).is_empty());
        assert_eq!(engine.poll(t0 + Duration::from_millis(300)), vec!["file:///a.ts"]);
        assert_eq!(engine.drain_index_queue(t0 + Duration::from_secs(1)), vec!["file:///a.ts"]);
    }
}
