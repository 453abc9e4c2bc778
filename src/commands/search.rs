//! @acp:module "Search Command"
//! @acp:summary "Free-text search and filtering over the tag index"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use console::style;

use crate::config::Config;
use crate::index::TagInfo;
use crate::query::{search, TagFilter};

use super::index::load_index;

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub root: PathBuf,
    pub from: Option<PathBuf>,
    /// Regex matched against the line and tag text
    pub query: Option<String>,
    /// Criteria given on the command line
    pub filter: TagFilter,
    /// Start from a filter saved in the configuration
    pub saved: Option<String>,
    /// Save the effective filter under this name
    pub save_as: Option<String>,
    /// Config file to update with `save_as`
    pub config_path: PathBuf,
    pub json: bool,
}

/// Command-line criteria override the saved ones field by field.
fn merge(base: &TagFilter, overrides: &TagFilter) -> TagFilter {
    TagFilter {
        tag_names: if overrides.tag_names.is_empty() {
            base.tag_names.clone()
        } else {
            overrides.tag_names.clone()
        },
        file_pattern: overrides.file_pattern.clone().or_else(|| base.file_pattern.clone()),
        regex: overrides.regex.clone().or_else(|| base.regex.clone()),
        assignee: overrides.assignee.clone().or_else(|| base.assignee.clone()),
    }
}

/// Execute the search command
pub fn execute_search(options: SearchOptions, mut config: Config) -> Result<()> {
    let filter = match &options.saved {
        Some(name) => {
            let saved = config
                .saved_filter(name)
                .ok_or_else(|| anyhow!("No saved filter named {:?}", name))?;
            merge(saved, &options.filter)
        }
        None => options.filter.clone(),
    };

    if let Some(name) = &options.save_as {
        config.save_filter(name, filter.clone());
        config.save(&options.config_path)?;
        println!(
            "{} Saved filter {:?} to {}",
            style("✓").green(),
            name,
            options.config_path.display()
        );
    }

    let index = load_index(&options.root, options.from.as_deref(), &config)?;
    let filtered = filter.apply(&index)?;
    let results: Vec<&TagInfo> = match &options.query {
        Some(query) => search(&filtered, query)?,
        None => filtered.iter().collect(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No results found", style("⚠").yellow());
        return Ok(());
    }

    for info in &results {
        let line = info.full_line.trim();
        let shown: String = line.chars().take(100).collect();
        println!(
            "{}:{}  {}  {}",
            info.file_path,
            info.line + 1,
            style(&info.tag_name).bold().yellow(),
            style(shown).dim()
        );
    }
    println!("{} Found {} results", style("✓").green(), results.len());
    Ok(())
}
