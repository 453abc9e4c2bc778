//! @acp:module "Tag Index"
//! @acp:summary "Workspace-wide tag index built by a line-oriented matcher"
//! @acp:domain core
//! @acp:layer service
//!
//! The index path is independent from the decoration engine. It tests every
//! line against every tag pattern and, when `match_only_in_comments` is on,
//! keeps a match only if the language's comment prefix appears before it on
//! the line. Block comment interiors without a prefix are therefore missed;
//! the index favours speed over the precision of [`crate::extract::Matcher`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use indicatif::ProgressBar;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::extract::TagMatch;
use crate::language::{BuiltinLanguages, ProfileResolver, PLAIN_TEXT};
use crate::span::next_char_boundary;
use crate::tags::{trim_range, TagConfig};

/// @acp:summary "One indexed tag occurrence"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInfo {
    pub tag_name: String,
    pub file_path: String,
    /// 0-based
    pub line: usize,
    /// 0-based, in characters
    pub column: usize,
    pub text: String,
    pub full_line: String,
}

impl TagInfo {
    pub fn from_match(file_path: &str, m: &TagMatch) -> Self {
        Self {
            tag_name: m.tag_name.clone(),
            file_path: file_path.to_string(),
            line: m.line,
            column: m.column,
            text: m.matched_text.clone(),
            full_line: m.full_line.clone(),
        }
    }
}

struct IndexPattern {
    name: String,
    regex: Regex,
}

/// @acp:summary "Compiled patterns and switches for the index path"
pub struct IndexOptions {
    patterns: Vec<IndexPattern>,
    match_only_in_comments: bool,
    resolver: ProfileResolver,
    max_file_size: u64,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl IndexOptions {
    /// Invalid patterns are skipped with a warning.
    pub fn new(tags: &[TagConfig], match_only_in_comments: bool, resolver: ProfileResolver) -> Self {
        let mut patterns = Vec::with_capacity(tags.len());
        for tag in tags {
            match index_pattern(tag) {
                Ok(regex) => patterns.push(IndexPattern {
                    name: tag.tag.clone(),
                    regex,
                }),
                Err(e) => tracing::warn!("Skipping tag {:?} for indexing: {}", tag.tag, e),
            }
        }

        Self {
            patterns,
            match_only_in_comments,
            resolver,
            max_file_size: u64::MAX,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::new(&config.tags, config.match_only_in_comments, config.resolver());
        options.max_file_size = config.max_file_size();
        options.include = config.include.clone();
        options.exclude = config.exclude.clone();
        options
    }

    pub fn with_globs(mut self, include: Vec<String>, exclude: Vec<String>) -> Self {
        self.include = include;
        self.exclude = exclude;
        self
    }

    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(&self.include, &self.exclude)
    }

    /// Token that must precede a match on its line: the first line delimiter,
    /// or the block start for block-only languages.
    pub fn comment_prefix(&self, language_id: &str) -> Option<String> {
        let profile = self.resolver.resolve(language_id)?;
        profile
            .line_delimiters
            .first()
            .cloned()
            .or_else(|| profile.block.map(|b| b.start))
    }
}

fn index_pattern(tag: &TagConfig) -> std::result::Result<Regex, regex::Error> {
    match tag.pattern.as_deref() {
        Some(p) if !p.trim().is_empty() => Regex::new(&format!("(?i){}", p)),
        _ if tag.tag.chars().all(|c| c.is_alphanumeric() || c == '_') => {
            Regex::new(&format!(r"(?i)\b{}\b[:\s]?", regex::escape(&tag.tag)))
        }
        _ => Regex::new(&format!(r"(?i){}[:\s]?", regex::escape(&tag.tag))),
    }
}

/// Editor language identifier for a path, `plaintext` when unknown
pub fn language_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(BuiltinLanguages::language_for_extension)
        .unwrap_or(PLAIN_TEXT)
}

/// @acp:summary "Index one file's text line by line"
///
/// Each tag contributes at most its first non-blank match per line. Reported
/// text and column exclude surrounding whitespace.
pub fn index_file(path: &Path, text: &str, language_id: &str, options: &IndexOptions) -> Vec<TagMatch> {
    let prefix = if options.match_only_in_comments {
        options.comment_prefix(language_id)
    } else {
        None
    };

    let mut matches = Vec::new();
    let mut offset = 0;
    for (number, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        for pattern in &options.patterns {
            let Some((start, end)) = first_visible(&pattern.regex, line) else {
                continue;
            };
            if let Some(prefix) = &prefix {
                if !line[..start].contains(prefix.as_str()) {
                    continue;
                }
            }

            matches.push(TagMatch {
                tag_name: pattern.name.clone(),
                line: number,
                column: line[..start].chars().count(),
                matched_text: line[start..end].to_string(),
                full_line: line.to_string(),
                start: offset + start,
                end: offset + end,
                kind: None,
            });
        }

        offset += raw.len() + 1;
    }

    tracing::trace!("Indexed {} tags in {}", matches.len(), path.display());
    matches
}

/// Leftmost match of `regex` in `line` that is not blank once trimmed.
fn first_visible(regex: &Regex, line: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while from <= line.len() {
        let m = regex.find_at(line, from)?;
        if let Some(range) = trim_range(line, m.start(), m.end()) {
            return Some(range);
        }
        from = if m.end() > from {
            m.end()
        } else if from < line.len() {
            next_char_boundary(line, from)
        } else {
            return None;
        };
    }
    None
}

/// @acp:summary "Tag occurrences grouped by tag name"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<TagInfo>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_infos(infos: impl IntoIterator<Item = TagInfo>) -> Self {
        let mut index = Self::new();
        for info in infos {
            index.insert(info);
        }
        index
    }

    pub fn insert(&mut self, info: TagInfo) {
        self.tags.entry(info.tag_name.clone()).or_default().push(info);
    }

    /// Replace a file's entries with the matches of `text`
    pub fn update_file(&mut self, file_path: &str, text: &str, language_id: &str, options: &IndexOptions) -> Vec<TagInfo> {
        self.remove_file(file_path);
        let infos: Vec<TagInfo> = index_file(Path::new(file_path), text, language_id, options)
            .iter()
            .map(|m| TagInfo::from_match(file_path, m))
            .collect();
        for info in &infos {
            self.insert(info.clone());
        }
        infos
    }

    /// @acp:summary "Read a file from disk and reindex it"
    ///
    /// Files over the configured size limit are dropped from the index.
    pub fn scan_file(&mut self, path: &Path, options: &IndexOptions) -> Result<Vec<TagInfo>> {
        self.scan_file_as(path, &path.to_string_lossy(), options)
    }

    /// Like [`Self::scan_file`], recording entries under `file_path`
    pub fn scan_file_as(&mut self, path: &Path, file_path: &str, options: &IndexOptions) -> Result<Vec<TagInfo>> {
        let file_path = file_path.to_string();
        if fs::metadata(path)?.len() > options.max_file_size {
            tracing::debug!("Skipping {}: over size limit", file_path);
            self.remove_file(&file_path);
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(path)?;
        Ok(self.update_file(&file_path, &text, language_for_path(path), options))
    }

    /// Drop every entry of a file; returns how many were removed.
    pub fn remove_file(&mut self, file_path: &str) -> usize {
        let mut removed = 0;
        for infos in self.tags.values_mut() {
            let before = infos.len();
            infos.retain(|i| i.file_path != file_path);
            removed += before - infos.len();
        }
        self.tags.retain(|_, infos| !infos.is_empty());
        removed
    }

    /// @acp:summary "Index every matching file under a root"
    pub fn scan_workspace(root: &Path, options: &IndexOptions) -> Result<Self> {
        Self::scan_workspace_with_progress(root, options, &ProgressBar::hidden())
    }

    /// @acp:summary "Index a workspace in parallel, ticking a progress bar per file"
    /// @acp:ai-careful "This processes many files in parallel"
    ///
    /// Paths are recorded relative to `root`. Unreadable files are skipped
    /// with a warning. Results are merged in path order.
    pub fn scan_workspace_with_progress(root: &Path, options: &IndexOptions, progress: &ProgressBar) -> Result<Self> {
        let files = find_files(root, &options.path_filter()?);
        progress.set_length(files.len() as u64);

        let mut results: Vec<(String, Vec<TagMatch>)> = files
            .par_iter()
            .filter_map(|path| {
                let relative = relative_path(root, path);
                progress.inc(1);

                match fs::metadata(path) {
                    Ok(meta) if meta.len() > options.max_file_size => return None,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Cannot stat {}: {}", relative, e);
                        return None;
                    }
                }
                let text = match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Cannot read {}: {}", relative, e);
                        return None;
                    }
                };
                let matches = index_file(path, &text, language_for_path(path), options);
                Some((relative, matches))
            })
            .collect();

        results.sort_by(|a, b| a.0.cmp(&b.0));
        progress.finish_and_clear();

        let mut index = Self::new();
        for (file, matches) in &results {
            for m in matches {
                index.insert(TagInfo::from_match(file, m));
            }
        }
        tracing::debug!(
            "Indexed {} tags across {} files",
            index.len(),
            results.len()
        );
        Ok(index)
    }

    pub fn tags(&self) -> &BTreeMap<String, Vec<TagInfo>> {
        &self.tags
    }

    pub fn get(&self, tag: &str) -> &[TagInfo] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entry, grouped by tag name in name order
    pub fn iter(&self) -> impl Iterator<Item = &TagInfo> {
        self.tags.values().flatten()
    }

    pub fn files(&self) -> BTreeSet<&str> {
        self.iter().map(|i| i.file_path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tags.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// @acp:summary "Include/exclude glob matching on root-relative paths"
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Pattern::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// An empty include list admits every path not excluded.
    pub fn matches(&self, relative: &str) -> bool {
        let opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches_with(relative, opts));
        included && !self.exclude.iter().any(|p| p.matches_with(relative, opts))
    }
}

/// Path relative to `root`, or the path itself when outside it
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Files under `root` admitted by `filter`, sorted
pub(crate) fn find_files(root: &Path, filter: &PathFilter) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| filter.matches(&relative_path(root, e.path())))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}
