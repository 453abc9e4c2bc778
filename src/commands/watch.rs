//! @acp:module "Watch Command"
//! @acp:summary "Watch for changes and keep the tag index current"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::export;
use crate::watch::{WatchUpdate, WorkspaceWatcher};

use super::index::index_workspace;

/// Options for the watch command
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Root directory to watch
    pub root: PathBuf,
    /// Rewrite this JSON export after every update
    pub output: Option<PathBuf>,
}

/// Execute the watch command
pub fn execute_watch(options: WatchOptions, config: Config) -> Result<()> {
    let mut index = index_workspace(&options.root, &config, false)?;
    let mut watcher = WorkspaceWatcher::new(&options.root, &config)?;
    println!(
        "{} Watching {} ({} tags indexed)",
        style("→").cyan(),
        watcher.root().display(),
        index.len()
    );

    watcher.run(&mut index, |update, index| {
        match update {
            WatchUpdate::Indexed { file, tags } => {
                println!("{} {} ({} tags)", style("↻").cyan(), file, tags.len())
            }
            WatchUpdate::Removed { file, count } => {
                println!("{} {} ({} tags removed)", style("✗").red(), file, count)
            }
        }

        if let Some(output) = &options.output {
            let written = export::to_json(index).and_then(|json| Ok(std::fs::write(output, json)?));
            if let Err(e) = written {
                tracing::warn!("Cannot write {}: {}", output.display(), e);
            }
        }
    })?;

    Ok(())
}
