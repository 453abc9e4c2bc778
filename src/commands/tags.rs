//! @acp:module "Tags Command"
//! @acp:summary "List the configured tag table and any rejected definitions"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::config::Config;
use crate::tags::TagSet;

/// Options for the tags command
#[derive(Debug, Clone, Default)]
pub struct TagsOptions {
    pub json: bool,
}

#[derive(Serialize)]
struct TagRow<'a> {
    name: &'a str,
    pattern: String,
    color: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Execute the tags command
pub fn execute_tags(options: TagsOptions, config: Config) -> Result<()> {
    let set = TagSet::compile(&config.tags);
    let rows: Vec<TagRow> = config
        .tags
        .iter()
        .map(|tag| {
            let rejected = set.rejected().iter().find(|r| r.name == tag.tag);
            TagRow {
                name: &tag.tag,
                pattern: tag.effective_pattern(),
                color: &tag.presentation.color,
                valid: rejected.is_none(),
                error: rejected.map(|r| r.reason.as_str()),
            }
        })
        .collect();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} ({} usable)", style("Configured Tags").bold(), set.len());
    for row in &rows {
        let marker = if row.valid {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {:<10} {}", marker, row.name, style(&row.pattern).dim());
        if let Some(error) = row.error {
            println!("      {}", style(error).red());
        }
    }
    Ok(())
}
