//! @acp:module "Stats Command"
//! @acp:summary "Aggregate counts over the tag index"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::query::Statistics;

use super::index::load_index;

/// Options for the stats command
#[derive(Debug, Clone)]
pub struct StatsOptions {
    pub root: PathBuf,
    pub from: Option<PathBuf>,
    pub json: bool,
}

/// Execute the stats command
pub fn execute_stats(options: StatsOptions, config: Config) -> Result<()> {
    let index = load_index(&options.root, options.from.as_deref(), &config)?;
    let stats = Statistics::from_index(&index);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", style("Comment Statistics").bold());
    println!("{}", "=".repeat(60));
    println!("Total tags:      {}", stats.total_tags);
    println!("Files with tags: {}", stats.total_files);
    println!("Average per file: {:.1}", stats.average_tags_per_file);
    if !stats.most_common_tag.is_empty() {
        println!("Most common:     {}", style(&stats.most_common_tag).yellow());
    }

    if !stats.tags_by_type.is_empty() {
        println!();
        println!("{}:", style("Tags by Type").bold());
        for (tag, count) in &stats.tags_by_type {
            let share = *count as f64 / stats.total_tags as f64 * 100.0;
            println!("  {:<10} {:>5}  {:>5.1}%", tag, count, share);
        }
    }

    if !stats.files_with_most_tags.is_empty() {
        println!();
        println!("{}:", style("Top Files").bold());
        for row in &stats.files_with_most_tags {
            println!("  {:>5}  {}", row.count, row.file);
        }
    }
    Ok(())
}
