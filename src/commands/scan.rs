//! @acp:module "Scan Command"
//! @acp:summary "Run the decoration engine over single files"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;
use crate::decorate::MemorySink;
use crate::document::Document;
use crate::engine::{Engine, ScanStatus};
use crate::extract::TagMatch;
use crate::index::language_for_path;

/// Options for the scan command
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub files: Vec<PathBuf>,
    /// Language identifier overriding the one implied by the extension
    pub language: Option<String>,
    /// Output as JSON
    pub json: bool,
}

/// Execute the scan command
pub fn execute_scan(options: ScanOptions, config: Config) -> Result<()> {
    let mut engine = Engine::new(&config);
    let mut all: Vec<(String, Vec<TagMatch>)> = Vec::new();

    for path in &options.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let language = options
            .language
            .clone()
            .unwrap_or_else(|| language_for_path(path).to_string());
        let doc = Document::new(path.to_string_lossy(), language.as_str(), text);

        if !engine.open(&doc) {
            eprintln!(
                "{} {}: language {:?} not supported",
                style("⚠").yellow(),
                path.display(),
                language
            );
            continue;
        }

        match engine.scan(&doc) {
            ScanStatus::Accumulated { .. } => {}
            ScanStatus::Stale => continue,
            ScanStatus::Skipped(reason) => {
                tracing::debug!("Skipped {}: {:?}", path.display(), reason);
                continue;
            }
        }
        let matches = engine.matches().to_vec();

        let mut sink = MemorySink::new();
        engine.apply_decorations(&doc, &mut sink);
        tracing::debug!("{}: {} decoration flushes", path.display(), sink.flushes());

        all.push((path.display().to_string(), matches));
    }

    if options.json {
        let value: serde_json::Map<String, serde_json::Value> = all
            .into_iter()
            .map(|(file, matches)| Ok((file, serde_json::to_value(matches)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut total = 0;
    for (file, matches) in &all {
        for m in matches {
            println!(
                "{}:{}:{}  {}  {}",
                file,
                m.line + 1,
                m.column + 1,
                style(&m.tag_name).bold().yellow(),
                m.full_line.trim()
            );
        }
        total += matches.len();
    }
    println!("{} {} matches", style("✓").green(), total);
    Ok(())
}
