//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule and takes an `*Options` struct plus
//! the loaded [`crate::Config`].

pub mod check;
pub mod export;
pub mod index;
pub mod remind;
pub mod scan;
pub mod search;
pub mod stats;
pub mod tags;
pub mod watch;

pub use check::{execute_check, CheckOptions};
pub use export::{execute_export, ExportOptions};
pub use index::{execute_index, index_workspace, load_index, IndexCommandOptions};
pub use remind::{execute_remind, RemindOptions};
pub use scan::{execute_scan, ScanOptions};
pub use search::{execute_search, SearchOptions};
pub use stats::{execute_stats, StatsOptions};
pub use tags::{execute_tags, TagsOptions};
pub use watch::{execute_watch, WatchOptions};
