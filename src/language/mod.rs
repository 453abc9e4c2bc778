//! @acp:module "Language Profiles"
//! @acp:summary "Resolves a language identifier to its comment delimiters and special cases"
//! @acp:domain core
//! @acp:layer service
//!
//! Delimiters come from a [`CommentConfigSource`], the host's per-language
//! comment configuration. The crate ships [`BuiltinLanguages`] and configuration
//! may layer overrides on top of it. A language without comment configuration is
//! unsupported, which is a normal state: nothing is scanned.

mod builtin;

pub use builtin::BuiltinLanguages;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Languages whose first line is a directive (shebang, encoding declaration).
const IGNORE_FIRST_LINE: &[&str] = &["elixir", "python", "tcl", "shellscript", "perl", "ruby"];

/// Languages with `/** */` documentation blocks.
const DOC_COMMENT_LANGUAGES: &[&str] = &[
    "apex",
    "javascript",
    "javascriptreact",
    "typescript",
    "typescriptreact",
];

/// Markup-in-code dialects with `{/* */}` comments.
const EMBEDDED_COMMENT_LANGUAGES: &[&str] = &["javascriptreact", "typescriptreact", "jsx", "tsx"];

pub const PLAIN_TEXT: &str = "plaintext";

/// @acp:summary "Line comment token(s) as the host reports them"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineComment {
    Single(String),
    Multiple(Vec<String>),
}

impl LineComment {
    pub fn delimiters(&self) -> Vec<String> {
        let raw = match self {
            LineComment::Single(d) => vec![d.clone()],
            LineComment::Multiple(ds) => ds.clone(),
        };
        raw.into_iter().filter(|d| !d.is_empty()).collect()
    }
}

/// @acp:summary "Host comment configuration for one language"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_comment: Option<LineComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_comment: Option<[String; 2]>,
}

impl CommentConfiguration {
    pub fn line(delimiter: &str) -> Self {
        Self {
            line_comment: Some(LineComment::Single(delimiter.to_string())),
            block_comment: None,
        }
    }

    pub fn with_block(mut self, start: &str, end: &str) -> Self {
        self.block_comment = Some([start.to_string(), end.to_string()]);
        self
    }
}

/// @acp:summary "Supplies comment configuration per language identifier"
pub trait CommentConfigSource: Send + Sync {
    fn comment_configuration(&self, language_id: &str) -> Option<CommentConfiguration>;
}

/// Configured overrides consulted before the builtin table.
#[derive(Debug, Clone, Default)]
pub struct LayeredSource {
    overrides: HashMap<String, CommentConfiguration>,
    builtin: BuiltinLanguages,
}

impl LayeredSource {
    pub fn new(overrides: HashMap<String, CommentConfiguration>) -> Self {
        Self {
            overrides,
            builtin: BuiltinLanguages,
        }
    }
}

impl CommentConfigSource for LayeredSource {
    fn comment_configuration(&self, language_id: &str) -> Option<CommentConfiguration> {
        self.overrides
            .get(language_id)
            .cloned()
            .or_else(|| self.builtin.comment_configuration(language_id))
    }
}

/// @acp:summary "Block comment start/end pair"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDelimiters {
    pub start: String,
    pub end: String,
}

impl BlockDelimiters {
    /// Documentation-style start: the start marker with its last character doubled (`/**`).
    pub fn doc_start(&self) -> Option<String> {
        let last = self.start.chars().last()?;
        Some(format!("{}{}", self.start, last))
    }
}

/// @acp:summary "Resolved, immutable comment syntax of one language"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCommentProfile {
    pub language_id: String,
    pub line_delimiters: Vec<String>,
    pub block: Option<BlockDelimiters>,
    pub supports_doc_comments: bool,
    pub supports_embedded: bool,
    pub ignore_first_line: bool,
    pub is_plain_text: bool,
}

impl LanguageCommentProfile {
    /// @acp:summary "Build a profile from host configuration plus per-language flags"
    ///
    /// Returns `None` when the configuration has neither line nor block comments.
    pub fn from_configuration(language_id: &str, config: &CommentConfiguration) -> Option<Self> {
        let line_delimiters = config
            .line_comment
            .as_ref()
            .map(LineComment::delimiters)
            .unwrap_or_default();
        let block = config
            .block_comment
            .as_ref()
            .filter(|[start, end]| !start.is_empty() && !end.is_empty())
            .map(|[start, end]| BlockDelimiters {
                start: start.clone(),
                end: end.clone(),
            });

        if line_delimiters.is_empty() && block.is_none() {
            return None;
        }

        let has_block = block.is_some();
        Some(Self {
            language_id: language_id.to_string(),
            line_delimiters,
            block,
            supports_doc_comments: has_block && DOC_COMMENT_LANGUAGES.contains(&language_id),
            supports_embedded: has_block && EMBEDDED_COMMENT_LANGUAGES.contains(&language_id),
            ignore_first_line: IGNORE_FIRST_LINE.contains(&language_id),
            is_plain_text: false,
        })
    }

    /// Profile for opted-in plain text: no delimiters, whole-document scanning.
    pub fn plain_text() -> Self {
        Self {
            language_id: PLAIN_TEXT.to_string(),
            line_delimiters: Vec::new(),
            block: None,
            supports_doc_comments: false,
            supports_embedded: false,
            ignore_first_line: false,
            is_plain_text: true,
        }
    }

    pub fn has_line_comments(&self) -> bool {
        !self.line_delimiters.is_empty()
    }
}

/// @acp:summary "Resolves language identifiers to comment profiles"
pub struct ProfileResolver {
    source: Box<dyn CommentConfigSource>,
    highlight_plain_text: bool,
}

impl ProfileResolver {
    pub fn new(source: Box<dyn CommentConfigSource>, highlight_plain_text: bool) -> Self {
        Self {
            source,
            highlight_plain_text,
        }
    }

    /// Resolver over the builtin table and the given overrides
    pub fn with_overrides(
        overrides: HashMap<String, CommentConfiguration>,
        highlight_plain_text: bool,
    ) -> Self {
        Self::new(Box::new(LayeredSource::new(overrides)), highlight_plain_text)
    }

    /// @acp:summary "Resolve a language; `None` means unsupported"
    pub fn resolve(&self, language_id: &str) -> Option<LanguageCommentProfile> {
        if language_id == PLAIN_TEXT {
            return self
                .highlight_plain_text
                .then(LanguageCommentProfile::plain_text);
        }

        let config = self.source.comment_configuration(language_id)?;
        let profile = LanguageCommentProfile::from_configuration(language_id, &config);
        if profile.is_none() {
            tracing::debug!("Language {} has an empty comment configuration", language_id);
        }
        profile
    }
}

impl Default for ProfileResolver {
    fn default() -> Self {
        Self::with_overrides(HashMap::new(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_typescript() {
        let profile = ProfileResolver::default().resolve("typescript").unwrap();
        assert_eq!(profile.line_delimiters, vec!["//"]);
        assert_eq!(
            profile.block,
            Some(BlockDelimiters {
                start: "/*".into(),
                end: "*/".into()
            })
        );
        assert!(profile.supports_doc_comments);
        assert!(!profile.supports_embedded);
        assert!(!profile.ignore_first_line);
    }

    #[test]
    fn test_resolve_python_ignores_first_line() {
        let profile = ProfileResolver::default().resolve("python").unwrap();
        assert_eq!(profile.line_delimiters, vec!["#"]);
        assert!(profile.ignore_first_line);
        assert!(!profile.supports_doc_comments);
    }

    #[test]
    fn test_resolve_tsx_supports_embedded() {
        let profile = ProfileResolver::default().resolve("typescriptreact").unwrap();
        assert!(profile.supports_embedded);
        assert!(profile.supports_doc_comments);
    }

    #[test]
    fn test_unknown_language_is_unsupported() {
        assert!(ProfileResolver::default().resolve("no-such-language").is_none());
    }

    #[test]
    fn test_plain_text_requires_opt_in() {
        assert!(ProfileResolver::default().resolve(PLAIN_TEXT).is_none());

        let resolver = ProfileResolver::with_overrides(HashMap::new(), true);
        let profile = resolver.resolve(PLAIN_TEXT).unwrap();
        assert!(profile.is_plain_text);
        assert!(!profile.has_line_comments());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = HashMap::new();
        overrides.insert("python".to_string(), CommentConfiguration::line(";;"));
        overrides.insert(
            "mylang".to_string(),
            CommentConfiguration {
                line_comment: Some(LineComment::Multiple(vec!["--".into(), "".into(), "%%".into()])),
                block_comment: None,
            },
        );
        let resolver = ProfileResolver::with_overrides(overrides, false);

        assert_eq!(resolver.resolve("python").unwrap().line_delimiters, vec![";;"]);
        assert_eq!(resolver.resolve("mylang").unwrap().line_delimiters, vec!["--", "%%"]);
    }

    #[test]
    fn test_empty_configuration_is_unsupported() {
        let config = CommentConfiguration::default();
        assert!(LanguageCommentProfile::from_configuration("x", &config).is_none());
    }

    #[test]
    fn test_line_comment_deserializes_string_or_list() {
        let single: CommentConfiguration =
            serde_json::from_str(r#"{"lineComment": "//", "blockComment": ["/*", "*/"]}"#).unwrap();
        assert_eq!(single.line_comment, Some(LineComment::Single("//".into())));

        let multiple: CommentConfiguration =
            serde_json::from_str(r##"{"lineComment": ["//", "#"]}"##).unwrap();
        assert_eq!(
            multiple.line_comment.unwrap().delimiters(),
            vec!["//".to_string(), "#".to_string()]
        );
    }

    #[test]
    fn test_doc_start_doubles_last_char() {
        let block = BlockDelimiters {
            start: "/*".into(),
            end: "*/".into(),
        };
        assert_eq!(block.doc_start().as_deref(), Some("/**"));
    }
}
