//! @acp:module "Query"
//! @acp:summary "Filtering, free-text search and statistics over the tag index"
//! @acp:domain core
//! @acp:layer service
//!
//! All regular expressions here are case-insensitive.

use std::collections::{BTreeMap, HashMap};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CraftError, Result};
use crate::index::{TagIndex, TagInfo};

fn compile(label: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CraftError::InvalidPattern {
            tag: label.to_string(),
            source,
        })
}

/// @acp:summary "Criteria narrowing an index to a subset of entries"
///
/// Empty criteria match everything. All set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    /// Keep only these tag names; empty keeps all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_names: Vec<String>,

    /// Regex tested against the file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_pattern: Option<String>,

    /// Regex tested against the full line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Entries whose line mentions `@name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TagFilter {
    pub fn is_empty(&self) -> bool {
        self.tag_names.is_empty()
            && self.file_pattern.is_none()
            && self.regex.is_none()
            && self.assignee.is_none()
    }

    /// @acp:summary "Build the subset of an index that passes every criterion"
    pub fn apply(&self, index: &TagIndex) -> Result<TagIndex> {
        let file_re = self
            .file_pattern
            .as_deref()
            .map(|p| compile("file pattern", p))
            .transpose()?;
        let text_re = self
            .regex
            .as_deref()
            .map(|p| compile("text pattern", p))
            .transpose()?;
        let assignee_re = self
            .assignee
            .as_deref()
            .map(|name| compile("assignee", &format!(r"@{}\b", regex::escape(name.trim_start_matches('@')))))
            .transpose()?;

        let wanted = |info: &TagInfo| {
            (self.tag_names.is_empty() || self.tag_names.iter().any(|t| t == &info.tag_name))
                && file_re.as_ref().map_or(true, |re| re.is_match(&info.file_path))
                && text_re.as_ref().map_or(true, |re| re.is_match(&info.full_line))
                && assignee_re.as_ref().map_or(true, |re| re.is_match(&info.full_line))
        };

        Ok(TagIndex::from_infos(index.iter().filter(|i| wanted(i)).cloned()))
    }
}

/// @acp:summary "Entries whose line or tag text matches a regex"
pub fn search<'a>(index: &'a TagIndex, query: &str) -> Result<Vec<&'a TagInfo>> {
    let re = compile("search", query)?;
    Ok(index
        .iter()
        .filter(|info| re.is_match(&info.full_line) || re.is_match(&info.text))
        .collect())
}

/// One row of the busiest-files ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCount {
    pub file: String,
    pub count: usize,
}

/// @acp:summary "Aggregate counts over an index"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_tags: usize,
    pub tags_by_type: BTreeMap<String, usize>,
    pub tags_by_file: BTreeMap<String, usize>,
    /// Empty when the index is empty
    pub most_common_tag: String,
    /// Top ten, most tags first, ties by path
    pub files_with_most_tags: Vec<FileCount>,
    pub total_files: usize,
    pub average_tags_per_file: f64,
}

/// How many files the ranking keeps
const TOP_FILES: usize = 10;

impl Statistics {
    pub fn from_index(index: &TagIndex) -> Self {
        let mut tags_by_type = BTreeMap::new();
        let mut by_file: HashMap<&str, usize> = HashMap::new();
        let mut most_common_tag = String::new();
        let mut max_count = 0;

        for (tag, infos) in index.tags() {
            tags_by_type.insert(tag.clone(), infos.len());
            // strict > keeps the first tag in name order on ties
            if infos.len() > max_count {
                max_count = infos.len();
                most_common_tag = tag.clone();
            }
            for info in infos {
                *by_file.entry(info.file_path.as_str()).or_default() += 1;
            }
        }

        let total_tags: usize = tags_by_type.values().sum();
        let mut ranking: Vec<FileCount> = by_file
            .iter()
            .map(|(file, count)| FileCount {
                file: file.to_string(),
                count: *count,
            })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.file.cmp(&b.file)));
        ranking.truncate(TOP_FILES);

        let total_files = by_file.len();
        Self {
            total_tags,
            tags_by_type,
            tags_by_file: by_file.into_iter().map(|(f, c)| (f.to_string(), c)).collect(),
            most_common_tag,
            files_with_most_tags: ranking,
            total_files,
            average_tags_per_file: if total_files > 0 {
                total_tags as f64 / total_files as f64
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn info(tag: &str, file: &str, line: usize, full_line: &str) -> TagInfo {
        TagInfo {
            tag_name: tag.to_string(),
            file_path: file.to_string(),
            line,
            column: 3,
            text: format!("{}:", tag),
            full_line: full_line.to_string(),
        }
    }

    fn sample() -> TagIndex {
        TagIndex::from_infos(vec![
            info("TODO", "src/a.rs", 0, "// TODO: wire up @alice"),
            info("TODO", "src/b.py", 4, "# TODO: cache results"),
            info("FIXME", "src/a.rs", 9, "// FIXME: @alicia overflow"),
            info("BUG", "lib/c.rs", 2, "// BUG: off by one"),
        ])
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = TagFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample()).unwrap(), sample());
    }

    #[test]
    fn test_filter_by_tag_and_file() {
        let filter = TagFilter {
            tag_names: vec!["TODO".into(), "BUG".into()],
            file_pattern: Some(r"\.RS$".into()),
            ..TagFilter::default()
        };
        let result = filter.apply(&sample()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("TODO")[0].file_path, "src/a.rs");
        assert_eq!(result.get("BUG").len(), 1);
    }

    #[test]
    fn test_assignee_needs_word_boundary() {
        let filter = TagFilter {
            assignee: Some("alice".into()),
            ..TagFilter::default()
        };
        let result = filter.apply(&sample()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("TODO")[0].line, 0);
    }

    #[test]
    fn test_invalid_filter_regex() {
        let filter = TagFilter {
            regex: Some("(".into()),
            ..TagFilter::default()
        };
        assert!(matches!(
            filter.apply(&sample()),
            Err(CraftError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = sample();
        let hits = search(&index, "CACHE").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "src/b.py");
        assert!(search(&index, "[").is_err());
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_index(&sample());
        assert_eq!(stats.total_tags, 4);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.most_common_tag, "TODO");
        assert_eq!(stats.tags_by_type["FIXME"], 1);
        assert_eq!(stats.tags_by_file["src/a.rs"], 2);
        assert_eq!(
            stats.files_with_most_tags[0],
            FileCount {
                file: "src/a.rs".into(),
                count: 2
            }
        );
        assert!((stats.average_tags_per_file - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_of_empty_index() {
        let stats = Statistics::from_index(&TagIndex::new());
        assert_eq!(stats.total_tags, 0);
        assert_eq!(stats.most_common_tag, "");
        assert_eq!(stats.average_tags_per_file, 0.0);
    }
}
