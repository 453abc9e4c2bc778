//! @acp:module "Export"
//! @acp:summary "JSON, CSV and Markdown writers for the tag index, plus a JSON reader"
//! @acp:domain core
//! @acp:layer output
//!
//! Exported lines and columns are 1-based.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CraftError, Result};
use crate::index::{TagIndex, TagInfo};

/// @acp:summary "Supported export formats"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    /// Parse a format name; `md` is accepted for Markdown.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(CraftError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::parse(ext)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    exported_at: String,
    tags: Vec<ExportedTag>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportedTag {
    name: String,
    count: usize,
    occurrences: Vec<Occurrence>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Occurrence {
    file: String,
    line: usize,
    column: usize,
    text: String,
    full_line: String,
}

/// @acp:summary "Render an index in the given format"
pub fn export(index: &TagIndex, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(index),
        ExportFormat::Csv => Ok(to_csv(index)),
        ExportFormat::Markdown => Ok(to_markdown(index)),
    }
}

/// Write an index to `path`, picking the format from the extension unless given.
pub fn write_file(index: &TagIndex, path: &Path, format: Option<ExportFormat>) -> Result<ExportFormat> {
    let format = match format {
        Some(format) => format,
        None => ExportFormat::from_path(path)?,
    };
    std::fs::write(path, export(index, format)?)?;
    tracing::debug!("Exported {} tags to {}", index.len(), path.display());
    Ok(format)
}

pub fn to_json(index: &TagIndex) -> Result<String> {
    to_json_at(index, Utc::now())
}

fn to_json_at(index: &TagIndex, at: DateTime<Utc>) -> Result<String> {
    let document = ExportDocument {
        exported_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        tags: index
            .tags()
            .iter()
            .map(|(name, infos)| ExportedTag {
                name: name.clone(),
                count: infos.len(),
                occurrences: infos
                    .iter()
                    .map(|info| Occurrence {
                        file: info.file_path.clone(),
                        line: info.line + 1,
                        column: info.column + 1,
                        text: info.text.clone(),
                        full_line: info.full_line.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// @acp:summary "Read a JSON export back into an index"
pub fn from_json(json: &str) -> Result<TagIndex> {
    let document: ExportDocument = serde_json::from_str(json)?;
    Ok(TagIndex::from_infos(document.tags.into_iter().flat_map(|tag| {
        let name = tag.name;
        tag.occurrences.into_iter().map(move |o| TagInfo {
            tag_name: name.clone(),
            file_path: o.file,
            line: o.line.saturating_sub(1),
            column: o.column.saturating_sub(1),
            text: o.text,
            full_line: o.full_line,
        })
    })))
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(index: &TagIndex) -> String {
    let mut lines = vec!["Tag,File,Line,Column,Text,Full Line".to_string()];
    for info in index.iter() {
        lines.push(format!(
            "{},{},{},{},{},{}",
            escape_csv(&info.tag_name),
            escape_csv(&info.file_path),
            info.line + 1,
            info.column + 1,
            escape_csv(&info.text),
            escape_csv(info.full_line.trim()),
        ));
    }
    lines.join("\n")
}

pub fn to_markdown(index: &TagIndex) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Comment Tags Export\n");
    let _ = writeln!(out, "**Exported:** {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "---\n");

    for (name, infos) in index.tags() {
        let _ = writeln!(out, "## {} ({})\n", name, infos.len());
        for info in infos {
            let _ = writeln!(
                out,
                "- **{}:{}** - {}",
                info.file_path,
                info.line + 1,
                info.full_line.trim()
            );
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TagIndex {
        TagIndex::from_infos(vec![
            TagInfo {
                tag_name: "TODO".into(),
                file_path: "src/a.rs".into(),
                line: 0,
                column: 3,
                text: "TODO:".into(),
                full_line: "// TODO: split, \"quote\"".into(),
            },
            TagInfo {
                tag_name: "BUG".into(),
                file_path: "src/b.rs".into(),
                line: 11,
                column: 7,
                text: "BUG".into(),
                full_line: "    // BUG overflow".into(),
            },
        ])
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ExportFormat::from_path(Path::new("out.md")).unwrap(), ExportFormat::Markdown);
        assert_eq!(ExportFormat::from_path(Path::new("out.CSV")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("json").unwrap(), ExportFormat::Json);
        assert!(matches!(
            ExportFormat::from_path(Path::new("out.xml")),
            Err(CraftError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_json_uses_one_based_positions() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let json = to_json_at(&sample(), at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["exportedAt"], "2024-05-01T12:00:00.000Z");
        assert_eq!(value["tags"][0]["name"], "BUG");
        assert_eq!(value["tags"][0]["occurrences"][0]["line"], 12);
        assert_eq!(value["tags"][0]["occurrences"][0]["column"], 8);
        assert_eq!(value["tags"][0]["occurrences"][0]["fullLine"], "    // BUG overflow");
    }

    #[test]
    fn test_json_round_trip() {
        let json = to_json(&sample()).unwrap();
        assert_eq!(from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_csv_escaping() {
        let csv = to_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Tag,File,Line,Column,Text,Full Line");
        assert_eq!(lines[1], "BUG,src/b.rs,12,8,BUG,// BUG overflow");
        assert_eq!(lines[2], r#"TODO,src/a.rs,1,4,TODO:,"// TODO: split, ""quote""""#);
    }

    #[test]
    fn test_csv_quotes_carriage_returns() {
        assert_eq!(escape_csv("a\rb"), "\"a\rb\"");
        assert_eq!(escape_csv("plain"), "plain");

        let index = TagIndex::from_infos(vec![TagInfo {
            tag_name: "TODO".into(),
            file_path: "a.rs".into(),
            line: 0,
            column: 3,
            text: "TODO".into(),
            full_line: "// TODO old\rmac line".into(),
        }]);
        assert!(to_csv(&index).contains("\"// TODO old\rmac line\""));
    }

    #[test]
    fn test_markdown_sections() {
        let md = to_markdown(&sample());
        assert!(md.starts_with("# Comment Tags Export\n"));
        assert!(md.contains("## TODO (1)\n"));
        assert!(md.contains("- **src/b.rs:12** - // BUG overflow\n"));
    }
}
