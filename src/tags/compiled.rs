//! @acp:module "Compiled Tags"
//! @acp:summary "Validated, compiled tag patterns rebuilt once per configuration change"
//! @acp:domain core
//! @acp:layer service

use regex::Regex;

use super::{PresentationHints, TagConfig};
use crate::error::CraftError;

/// Leading anchors stripped before a pattern is tested against comment text.
const LEADING_ANCHORS: &[&str] = &[r"(^|\s)", r"(?:^|\s)", "^"];

/// @acp:summary "A tag definition with its matchers compiled"
#[derive(Debug, Clone)]
pub struct CompiledTag {
    pub name: String,
    pub presentation: PresentationHints,
    /// Pattern anchored at the start of comment text, one optional leading space allowed
    strict: Regex,
    /// Pattern anchored at line start or after whitespace, for whole-text scanning
    anchored: Regex,
    /// Whole-word checks for the bare name and aliases
    words: Vec<Regex>,
}

impl CompiledTag {
    /// @acp:summary "Compile one tag configuration"
    pub fn compile(config: &TagConfig) -> Result<Self, CraftError> {
        let source = config.effective_pattern();
        let invalid = |source: regex::Error| CraftError::InvalidPattern {
            tag: config.tag.clone(),
            source,
        };

        // Validate the fragment on its own so that wrapping cannot hide an
        // unbalanced group.
        Regex::new(&source).map_err(invalid)?;

        let body = strip_leading_anchor(&source);
        let strict = Regex::new(&format!(r"(?i)^\s?(?:{})", body)).map_err(invalid)?;
        let anchored = Regex::new(&format!(r"(?im)(?:^|\s)(?:{})", body)).map_err(invalid)?;

        let mut words = Vec::new();
        for word in std::iter::once(config.tag.as_str()).chain(config.aliases.iter().map(String::as_str)) {
            let word = word.trim().trim_start_matches('@').trim_end_matches(':');
            if word.is_empty() {
                continue;
            }
            words.push(word_matcher(word).map_err(invalid)?);
        }

        Ok(Self {
            name: config.tag.clone(),
            presentation: config.presentation.clone(),
            strict,
            anchored,
            words,
        })
    }

    /// Match at the start of `text`. Returns the byte range of the tag token.
    ///
    /// Leading whitespace is excluded from the range and trailing whitespace is
    /// trimmed. Zero-width matches are rejected.
    pub fn match_strict(&self, text: &str) -> Option<(usize, usize)> {
        let m = self.strict.find(text)?;
        trim_range(text, m.start(), m.end())
    }

    /// Loose whole-word containment of the bare name or an alias
    pub fn match_word(&self, text: &str) -> Option<(usize, usize)> {
        self.words
            .iter()
            .filter_map(|re| re.captures(text).and_then(|c| c.get(1)))
            .map(|m| (m.start(), m.end()))
            .min_by_key(|(start, _)| *start)
    }

    /// First anchored match at or after `from`, used by plain-text scanning.
    pub fn find_anchored_at(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let m = self.anchored.find_at(text, from)?;
        Some((m.start(), m.end()))
    }
}

fn strip_leading_anchor(pattern: &str) -> &str {
    LEADING_ANCHORS
        .iter()
        .find_map(|anchor| pattern.strip_prefix(anchor))
        .unwrap_or(pattern)
}

fn word_matcher(word: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(word);
    let is_symbol = word.chars().count() == 1 && !word.chars().all(char::is_alphanumeric);
    if is_symbol {
        Regex::new(&format!(r"(?i)(?:^|\s)({})(?:\s|:|-|$)", escaped))
    } else {
        Regex::new(&format!(r"(?i)(?:^|[\s@])({})(?:\s|:|-|$)", escaped))
    }
}

/// Shrink `start..end` to exclude surrounding whitespace; `None` when nothing is left.
pub(crate) fn trim_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = start + leading;
    Some((start, start + trimmed.len()))
}

/// @acp:summary "A tag definition excluded because its pattern failed to compile"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTag {
    pub name: String,
    pub pattern: String,
    pub reason: String,
}

/// @acp:summary "Immutable compiled tag table, in configured order"
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    tags: Vec<CompiledTag>,
    rejected: Vec<RejectedTag>,
}

impl TagSet {
    /// @acp:summary "Compile a tag configuration, skipping invalid entries"
    ///
    /// Invalid patterns are logged once here and reported through
    /// [`TagSet::rejected`]; the remaining definitions are kept. Duplicate
    /// names keep their first definition.
    pub fn compile(configs: &[TagConfig]) -> Self {
        let mut tags: Vec<CompiledTag> = Vec::with_capacity(configs.len());
        let mut rejected = Vec::new();

        for config in configs {
            if tags.iter().any(|t| t.name == config.tag) {
                tracing::warn!("Duplicate tag definition ignored: {}", config.tag);
                continue;
            }
            match CompiledTag::compile(config) {
                Ok(tag) => tags.push(tag),
                Err(err) => {
                    tracing::warn!("Skipping tag {:?}: {}", config.tag, err);
                    rejected.push(RejectedTag {
                        name: config.tag.clone(),
                        pattern: config.effective_pattern(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Self { tags, rejected }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledTag> {
        self.tags.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledTag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    pub fn rejected(&self) -> &[RejectedTag] {
        &self.rejected
    }
}
