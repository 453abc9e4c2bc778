#![forbid(unsafe_code)]

//! @acp:module "Comment Craft Library"
//! @acp:summary "Comment tag recognition: locate comments, match tags, index and export them"
//! @acp:domain core
//! @acp:layer api
//! @acp:stability stable
//!
//! # Comment Craft
//!
//! Finds marker tags such as `TODO`, `FIXME`, `BUG` or `!` inside source
//! comments and reports where they are.
//!
//! ## Features
//!
//! - **Comment spans**: line, block, documentation and JSX-embedded comments per language
//! - **Tag matching**: ordered, user-configurable regex tags with a loose word fallback
//! - **Decorations**: per-tag highlight ranges flushed to a [`DecorationSink`]
//! - **Workspace index**: parallel line-oriented indexing, filters, statistics, export
//! - **Lifecycle**: reminders for urgent and overdue tags, comment hygiene checks
//!
//! ## Example
//!
//! ```rust
//! use commentcraft::{Config, Document, Engine, MemorySink, ScanStatus};
//!
//! let mut engine = Engine::new(&Config::default());
//! let doc = Document::new("main.rs", "rust", "fn main() {} // TODO: say hello\n");
//! engine.open(&doc);
//!
//! assert_eq!(engine.scan(&doc), ScanStatus::Accumulated { matches: 1 });
//! assert_eq!(engine.matches()[0].tag_name, "TODO");
//!
//! let mut sink = MemorySink::new();
//! engine.apply_decorations(&doc, &mut sink);
//! assert_eq!(sink.ranges("TODO").len(), 1);
//! ```

pub mod commands;
pub mod config;
pub mod decorate;
pub mod document;
pub mod engine;
pub mod error;
pub mod export;
pub mod extract;
pub mod index;
pub mod language;
pub mod lifecycle;
pub mod query;
pub mod schedule;
pub mod span;
pub mod tags;
pub mod watch;

// Re-exports
pub use config::{Config, SavedFilter};
pub use decorate::{DecorationSink, MemorySink, TagRanges};
pub use document::{Document, DocumentKey, Position, Range};
pub use engine::{ChangeDisposition, Engine, ScanStatus, ScanTicket, SkipReason};
pub use error::{CraftError, Result};
pub use export::ExportFormat;
pub use extract::{Matcher, TagMatch};
pub use index::{index_file, IndexOptions, TagIndex, TagInfo};
pub use language::{
    CommentConfigSource, CommentConfiguration, LanguageCommentProfile, ProfileResolver,
};
pub use lifecycle::{reminders, validate_text, Reminder, ReminderReason, Severity, ValidationIssue};
pub use query::{search, Statistics, TagFilter};
pub use schedule::{IndexQueue, ScanScheduler};
pub use span::{CommentKind, CommentSpan, LocateOptions, SpanLocator};
pub use tags::{canonical_tags, TagConfig, TagSet};
pub use watch::{WatchUpdate, WorkspaceWatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
