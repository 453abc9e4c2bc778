//! @acp:summary "Line-level comment hygiene checks"

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{find_files, relative_path, PathFilter};

/// Extensions `check` walks by default
pub const VALIDATED_EXTENSIONS: &[&str] = &["ts", "js", "tsx", "jsx", "py", "java", "cpp", "c", "cs"];

/// Files `check` validates per run unless told otherwise
pub const DEFAULT_MAX_FILES: usize = 100;

/// Longest declaration excerpt quoted in a message, in characters
const EXCERPT_CHARS: usize = 50;

static DECLARATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(public|private|protected)?\s*(async\s+)?function\s+\w+\s*\(",
        r"^(public|private|protected)?\s*(async\s+)?\w+\s*[:=]\s*(async\s+)?\(",
        r"^(public|private|protected)?\s*(async\s+)?const\s+\w+\s*=\s*(async\s+)?\(",
        r"^def\s+\w+\s*\(",
        r"^(public|private|protected)?\s*class\s+\w+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("declaration regex"))
    .collect()
});

static COMMENT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(//|/\*\*|#|<!--)").expect("comment regex"));

static WORK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)TODO|FIXME").expect("tag regex"));

static OWNER_OR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+|\d{4}-\d{2}-\d{2}").expect("owner regex"));

static COMMENTED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^//\s*(if|for|while|function|const|let|var|class)\b").expect("code regex")
});

/// @acp:summary "How serious a validation finding is"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// @acp:summary "One finding on one line"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub file: String,
    /// 1-based
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    /// The offending line, trimmed
    pub code: String,
}

/// @acp:summary "Check every line of a file for comment hygiene problems"
///
/// Reports, per line and in this order:
/// - a function or class declaration whose previous line is not a comment
/// - a `TODO`/`FIXME` that names neither an `@owner` nor an ISO date
/// - a `//` comment that starts like a statement (commented-out code)
pub fn validate_text(file: &str, text: &str) -> Vec<ValidationIssue> {
    let lines: Vec<&str> = text.lines().collect();
    let mut issues = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let issue = |severity, message: String| ValidationIssue {
            file: file.to_string(),
            line: i + 1,
            severity,
            message,
            code: trimmed.to_string(),
        };

        if DECLARATION_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
            let documented = i > 0 && COMMENT_START.is_match(lines[i - 1].trim());
            if !documented {
                let excerpt: String = trimmed.chars().take(EXCERPT_CHARS).collect();
                issues.push(issue(
                    Severity::Warning,
                    format!("Function/class \"{}\" lacks documentation", excerpt),
                ));
            }
        }

        if WORK_TAG.is_match(trimmed) && !OWNER_OR_DATE.is_match(trimmed) {
            issues.push(issue(
                Severity::Info,
                "TODO/FIXME comment should include assignee or date".to_string(),
            ));
        }

        if COMMENTED_CODE.is_match(trimmed) {
            issues.push(issue(
                Severity::Warning,
                "Commented-out code detected - consider removing".to_string(),
            ));
        }
    }

    issues
}

/// Include globs for [`VALIDATED_EXTENSIONS`] with the given excludes
pub fn validation_filter(exclude: &[String]) -> Result<PathFilter> {
    let include: Vec<String> = VALIDATED_EXTENSIONS
        .iter()
        .map(|ext| format!("**/*.{}", ext))
        .collect();
    PathFilter::new(&include, exclude)
}

/// @acp:summary "Validate the first `max_files` files under `root`, in path order"
///
/// Issues carry root-relative paths. Unreadable files are skipped with a warning.
pub fn validate_workspace(root: &Path, filter: &PathFilter, max_files: usize) -> Vec<ValidationIssue> {
    let mut files = find_files(root, filter);
    if files.len() > max_files {
        tracing::debug!("Validating {} of {} files", max_files, files.len());
        files.truncate(max_files);
    }

    files
        .par_iter()
        .flat_map_iter(|path| {
            let relative = relative_path(root, path);
            match fs::read_to_string(path) {
                Ok(text) => validate_text(&relative, &text),
                Err(e) => {
                    tracing::warn!("Cannot read {}: {}", relative, e);
                    Vec::new()
                }
            }
        })
        .collect()
}
