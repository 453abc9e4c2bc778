//! Decoration engine integration tests
//!
//! Drives the public engine API the way an editor host would: open a
//! document, notify edits, poll the scheduler, scan and flush decorations.

use std::time::{Duration, Instant};

use commentcraft::{
    ChangeDisposition, Config, Document, Engine, MemorySink, ScanStatus, SkipReason, TagConfig,
};
use pretty_assertions::assert_eq;

fn summary(engine: &Engine) -> Vec<(String, usize, usize)> {
    engine
        .matches()
        .iter()
        .map(|m| (m.tag_name.clone(), m.line, m.column))
        .collect()
}

// =============================================================================
// Matching scenarios
// =============================================================================

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_comment_with_trailing_marker() {
        let text = "// TODO: fix later\nconst x = 1; // not a comment marker // ! urgent\n";
        let doc = Document::new("file:///a.ts", "typescript", text);
        let mut engine = Engine::new(&Config::default());
        engine.open(&doc);

        assert_eq!(engine.scan(&doc), ScanStatus::Accumulated { matches: 2 });
        assert_eq!(
            summary(&engine),
            vec![("TODO".to_string(), 0, 3), ("!".to_string(), 1, 40)]
        );
        assert!(engine.matches()[0].matched_text.starts_with("TODO"));
    }

    #[test]
    fn test_block_comment_two_tags() {
        let doc = Document::new("file:///a.c", "c", "/* TODO: refactor\n * FIXME: edge case */\n");
        let mut engine = Engine::new(&Config::default());
        engine.open(&doc);

        assert_eq!(engine.scan(&doc), ScanStatus::Accumulated { matches: 2 });
        assert_eq!(
            summary(&engine),
            vec![("TODO".to_string(), 0, 3), ("FIXME".to_string(), 1, 3)]
        );
    }

    #[test]
    fn test_banner_block_has_no_star_matches() {
        let doc = Document::new(
            "file:///a.c",
            "c",
            "/*********\n * NOTE: x\n *********/\nint a;\n",
        );
        let mut engine = Engine::new(&Config::default());
        engine.open(&doc);

        assert_eq!(engine.scan(&doc), ScanStatus::Accumulated { matches: 1 });
        assert_eq!(summary(&engine), vec![("NOTE".to_string(), 1, 3)]);
        assert!(engine.matches().iter().all(|m| m.tag_name != "*"));
    }

    #[test]
    fn test_multiline_off_skips_block_comments() {
        let config = Config {
            multiline_comments: false,
            ..Config::default()
        };
        let doc = Document::new("file:///a.c", "c", "/* TODO: block */\n// TODO: line\n");
        let mut engine = Engine::new(&config);
        engine.open(&doc);

        engine.scan(&doc);
        assert_eq!(summary(&engine), vec![("TODO".to_string(), 1, 3)]);
    }

    #[test]
    fn test_shebang_language_drops_first_line_only() {
        let doc = Document::new("file:///a.py", "python", "# TODO: first\n# TODO: second\n");
        let mut engine = Engine::new(&Config::default());
        engine.open(&doc);

        engine.scan(&doc);
        assert_eq!(summary(&engine), vec![("TODO".to_string(), 1, 2)]);
    }

    #[test]
    fn test_invalid_tag_pattern_is_rejected_not_fatal() {
        let config = Config {
            tags: vec![TagConfig::new("BROKEN").with_pattern("("), TagConfig::new("TODO")],
            ..Config::default()
        };
        let mut engine = Engine::new(&config);
        assert_eq!(engine.tags().rejected().len(), 1);
        assert_eq!(engine.tags().rejected()[0].name, "BROKEN");

        let doc = Document::new("file:///a.rs", "rust", "// TODO: still found\n");
        engine.open(&doc);
        assert_eq!(engine.scan(&doc), ScanStatus::Accumulated { matches: 1 });
    }

    #[test]
    fn test_adversarial_patterns_terminate() {
        let config = Config {
            tags: vec![
                TagConfig::new("EMPTY").with_pattern("x*"),
                TagConfig::new("OPTIONAL").with_pattern("(TODO)?"),
            ],
            ..Config::default()
        };
        let text = "// \n/* */\n/**/\n//\n// TODO\n".repeat(20);
        let doc = Document::new("file:///a.rs", "rust", text);
        let mut engine = Engine::new(&config);
        engine.open(&doc);

        assert!(matches!(engine.scan(&doc), ScanStatus::Accumulated { .. }));
    }

    #[test]
    fn test_scanning_is_idempotent() {
        let doc = Document::new(
            "file:///a.ts",
            "typescript",
            "/** NOTE: doc */\n// TODO: a\n/* BUG: b */\n",
        );
        let mut engine = Engine::new(&Config::default());
        engine.open(&doc);

        engine.scan(&doc);
        let first = engine.matches().to_vec();
        engine.scan(&doc);
        assert_eq!(engine.matches(), first.as_slice());
    }
}

// =============================================================================
// Lifecycle: scheduling, reentrancy and staleness
// =============================================================================

mod lifecycle {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_of_edits_yields_one_scan() {
        let mut engine = Engine::new(&Config::default());
        let t0 = Instant::now();

        for (i, offset) in [0, 30, 60, 90].into_iter().enumerate() {
            let doc = Document::with_version("file:///a.rs", "rust", i as u64, "// TODO\n");
            assert_eq!(engine.on_change(doc.key(), t0 + ms(offset)), ChangeDisposition::Scheduled);
        }

        assert!(engine.poll(t0 + ms(150)).is_empty());
        assert_eq!(engine.poll(t0 + ms(190)), vec!["file:///a.rs".to_string()]);
        assert!(engine.poll(t0 + ms(400)).is_empty());
    }

    #[test]
    fn test_change_during_scan_is_deferred_and_queued() {
        let mut engine = Engine::new(&Config::default());
        let v1 = Document::with_version("file:///a.rs", "rust", 1, "// TODO\n");
        engine.open(&v1);
        let t0 = Instant::now();

        let ticket = engine.begin_scan(&v1).unwrap();
        assert_eq!(engine.begin_scan(&v1).unwrap_err(), SkipReason::Reentrant);

        let v2 = Document::with_version("file:///a.rs", "rust", 2, "// TODO\n// FIXME\n");
        assert_eq!(engine.on_change(v2.key(), t0), ChangeDisposition::Deferred);

        let matches = ticket.run(&v1);
        assert_eq!(engine.finish_scan(ticket, matches), ScanStatus::Stale);
        assert!(!engine.is_scanning());

        assert!(engine.poll(t0 + ms(1000)).is_empty());
        assert_eq!(engine.drain_index_queue(t0 + ms(500)), vec!["file:///a.rs".to_string()]);

        assert_eq!(engine.scan(&v2), ScanStatus::Accumulated { matches: 2 });
    }

    #[test]
    fn test_flush_reaches_every_configured_tag() {
        let mut engine = Engine::new(&Config::default());
        let doc = Document::new("file:///a.rs", "rust", "// TODO: one\n");
        engine.open(&doc);
        engine.scan(&doc);

        let mut sink = MemorySink::new();
        engine.apply_decorations(&doc, &mut sink);
        assert_eq!(sink.flushes(), engine.tags().len());
        assert_eq!(sink.ranges("TODO").len(), 1);
        assert!(sink.ranges("FIXME").is_empty());

        let mut again = MemorySink::new();
        engine.apply_decorations(&doc, &mut again);
        assert!(again.ranges("TODO").is_empty());
    }

    #[test]
    fn test_unsupported_and_disabled() {
        let mut engine = Engine::new(&Config::default());
        let doc = Document::new("file:///a.xyz", "no-such-language", "// TODO\n");
        assert!(!engine.open(&doc));
        assert_eq!(
            engine.scan(&doc),
            ScanStatus::Skipped(SkipReason::UnsupportedLanguage)
        );

        let mut disabled = Engine::new(&Config {
            enabled: false,
            ..Config::default()
        });
        let doc = Document::new("file:///a.rs", "rust", "// TODO\n");
        disabled.open(&doc);
        assert_eq!(disabled.scan(&doc), ScanStatus::Skipped(SkipReason::Disabled));
    }
}
