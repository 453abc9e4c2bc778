//! @acp:module "Check Command"
//! @acp:summary "Flag undocumented declarations, unowned TODOs and commented-out code"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;
use crate::lifecycle::{validate_text, validate_workspace, validation_filter, Severity, ValidationIssue};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Files to check; the whole workspace under `root` when empty
    pub files: Vec<PathBuf>,
    pub root: PathBuf,
    /// Workspace files validated per run
    pub max_files: usize,
    pub json: bool,
}

/// Execute the check command
pub fn execute_check(options: CheckOptions, config: Config) -> Result<()> {
    let issues = if options.files.is_empty() {
        let filter = validation_filter(&config.exclude)?;
        validate_workspace(&options.root, &filter, options.max_files)
    } else {
        let mut issues = Vec::new();
        for path in &options.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            issues.extend(validate_text(&path.display().to_string(), &text));
        }
        issues
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("{} No validation issues found", style("✓").green());
        return Ok(());
    }

    for issue in &issues {
        println!(
            "{}:{}: {} {}",
            issue.file,
            issue.line,
            severity_label(issue),
            issue.message
        );
    }
    println!();
    println!("{} {} validation issue(s)", style("⚠").yellow(), issues.len());
    Ok(())
}

fn severity_label(issue: &ValidationIssue) -> console::StyledObject<String> {
    let label = issue.severity.to_string();
    match issue.severity {
        Severity::Error => style(label).red(),
        Severity::Warning => style(label).yellow(),
        Severity::Info => style(label).cyan(),
    }
}
