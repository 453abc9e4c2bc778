//! @acp:module "Index Command"
//! @acp:summary "Index the workspace and print or write the tag index"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `commentcraft index`. Also hosts [`load_index`], which the
//! query-side commands use to obtain an index from disk or a fresh scan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::export;
use crate::index::{IndexOptions, TagIndex};

/// Options for the index command
#[derive(Debug, Clone)]
pub struct IndexCommandOptions {
    /// Root directory to index
    pub root: PathBuf,
    /// Write the index as a JSON export here
    pub output: Option<PathBuf>,
    /// Hide the progress bar
    pub quiet: bool,
}

impl Default for IndexCommandOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: None,
            quiet: false,
        }
    }
}

/// @acp:summary "Scan a workspace, optionally behind a progress bar"
pub fn index_workspace(root: &Path, config: &Config, show_progress: bool) -> Result<TagIndex> {
    let options = IndexOptions::from_config(config);
    let progress = if show_progress {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} files")?
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };
    let index = TagIndex::scan_workspace_with_progress(root, &options, &progress)
        .with_context(|| format!("Failed to index {}", root.display()))?;
    Ok(index)
}

/// Read a JSON export when `from` is given, otherwise scan `root`.
pub fn load_index(root: &Path, from: Option<&Path>, config: &Config) -> Result<TagIndex> {
    match from {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(export::from_json(&json)?)
        }
        None => index_workspace(root, config, false),
    }
}

/// Execute the index command
pub fn execute_index(options: IndexCommandOptions, config: Config) -> Result<()> {
    println!("{} Indexing {}...", style("→").cyan(), options.root.display());

    let index = index_workspace(&options.root, &config, !options.quiet)?;
    if index.is_empty() {
        println!("{} No tags found", style("⚠").yellow());
    }

    for (tag, infos) in index.tags() {
        println!("  {:<10} {}", style(tag).bold(), infos.len());
    }
    println!(
        "{} {} tags in {} files",
        style("✓").green(),
        index.len(),
        index.files().len()
    );

    if let Some(output) = &options.output {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, export::to_json(&index)?)?;
        println!("{} Index written to {}", style("✓").green(), output.display());
    }

    Ok(())
}
