//! @acp:module "Export Command"
//! @acp:summary "Write the tag index as JSON, CSV or Markdown"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::export::{self, ExportFormat};

use super::index::load_index;

/// Options for the export command
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub root: PathBuf,
    pub output: PathBuf,
    /// Format name; the output extension decides when absent
    pub format: Option<String>,
    /// Re-export an existing JSON export instead of scanning
    pub from: Option<PathBuf>,
}

/// Execute the export command
pub fn execute_export(options: ExportOptions, config: Config) -> Result<()> {
    let format = options.format.as_deref().map(ExportFormat::parse).transpose()?;
    let index = load_index(&options.root, options.from.as_deref(), &config)?;

    if index.is_empty() {
        println!("{} No tags found to export", style("⚠").yellow());
        return Ok(());
    }

    let format = export::write_file(&index, &options.output, format)?;
    println!(
        "{} Exported {} tags as {:?} to {}",
        style("✓").green(),
        index.len(),
        format,
        options.output.display()
    );
    Ok(())
}
