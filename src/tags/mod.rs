//! @acp:module "Tag Definitions"
//! @acp:summary "Configured tag table, presentation hints and the canonical defaults"
//! @acp:domain core
//! @acp:layer model
//!
//! A tag is a short marker keyword or symbol (TODO, FIXME, `!`) that signals an
//! annotation category. Each definition carries a regular expression fragment
//! matching the tag token. Fragments usually start with the `(^|\s)` anchor,
//! followed by optional symbol/emoji alternatives, an optional `@`, the tag
//! words and an optional trailing `:` or `-`.

mod compiled;

pub use compiled::{CompiledTag, RejectedTag, TagSet};
pub(crate) use compiled::trim_range;

use serde::{Deserialize, Serialize};

/// @acp:summary "Styling passed through to the presentation layer"
///
/// The engine never reads these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationHints {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
}

fn default_color() -> String {
    "#d19a66".to_string()
}

fn default_background() -> String {
    "transparent".to_string()
}

impl Default for PresentationHints {
    fn default() -> Self {
        Self {
            color: default_color(),
            background_color: default_background(),
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
        }
    }
}

/// @acp:summary "One entry of the user's tag configuration"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagConfig {
    /// Canonical name, unique within a configuration
    pub tag: String,

    /// Regex fragment; the escaped tag name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Plain-word synonyms accepted by the loose whole-word check
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(flatten)]
    pub presentation: PresentationHints,
}

impl TagConfig {
    /// Tag with no explicit pattern and default styling
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pattern: None,
            aliases: Vec::new(),
            presentation: PresentationHints::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Pattern source used for matching: the configured fragment, or the tag escaped
    pub fn effective_pattern(&self) -> String {
        match self.pattern.as_deref() {
            Some(p) if !p.trim().is_empty() => p.to_string(),
            _ => regex::escape(&self.tag),
        }
    }
}

struct Canonical {
    tag: &'static str,
    pattern: &'static str,
    aliases: &'static [&'static str],
    color: &'static str,
    background: Option<&'static str>,
    bold: bool,
    italic: bool,
    strikethrough: bool,
}

const CANONICAL: &[Canonical] = &[
    Canonical {
        tag: "TODO",
        pattern: r"(^|\s)(☐|➤|•|📌)?\s*@?(TODO|todo|@todo)\b\s*[:\-]?",
        aliases: &["todo"],
        color: "#d19a66",
        background: None,
        bold: true,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "FIXME",
        pattern: r"(^|\s)(🔧|❗|🛠)?\s*@?(FIXME|fixme|FIX|fix|@fixme)\b\s*[:\-]?",
        aliases: &["fix"],
        color: "#e06c75",
        background: Some("#2a1f1f"),
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "BUG",
        pattern: r"(^|\s)(🐞|✖|⛔)?\s*@?(BUG|bug|@bug|defect|DEFECT)\b\s*[:\-]?",
        aliases: &["defect"],
        color: "#e06c75",
        background: Some("#2a1f1f"),
        bold: true,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "NOTE",
        pattern: r"(^|\s)(ℹ|📝|📄)?\s*@?(NOTE|note|@note|info|INFO)\b\s*[:\-]?",
        aliases: &["info"],
        color: "#e91e63",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "HACK",
        pattern: r"(^|\s)(⚠|☢|🚧)?\s*@?(HACK|hack|@hack|workaround|WORKAROUND)\b\s*[:\-]?",
        aliases: &["workaround"],
        color: "#f39c12",
        background: None,
        bold: false,
        italic: true,
        strikethrough: false,
    },
    Canonical {
        tag: "OPTIMIZE",
        pattern: r"(^|\s)(⚡|📈|🚀)?\s*@?(OPTIMIZE|optimize|@optimize|perf|PERF|performance|PERFORMANCE)\b\s*[:\-]?",
        aliases: &["perf", "performance"],
        color: "#f1c40f",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "URGENT",
        pattern: r"(^|\s)(🚨|🔥|‼)?\s*@?(URGENT|urgent|@urgent|critical|CRITICAL|hotfix|HOTFIX)\b\s*[:\-]?",
        aliases: &["critical", "hotfix"],
        color: "#ffffff",
        background: Some("#d9534f"),
        bold: true,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "REVIEW",
        pattern: r"(^|\s)(👀|🔍|🧐)?\s*@?(REVIEW|review|@review|check|CHECK|audit|AUDIT)\b\s*[:\-]?",
        aliases: &["audit"],
        color: "#3498DB",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "DEPRECATED",
        pattern: r"(^|\s)(☠|🗑|⚰)?\s*@?(DEPRECATED|deprecated|@deprecated|obsolete|OBSOLETE)\b\s*[:\-]?",
        aliases: &["obsolete"],
        color: "#9b59b6",
        background: None,
        bold: false,
        italic: false,
        strikethrough: true,
    },
    Canonical {
        tag: "DONE",
        pattern: r"(^|\s)(✔|✅|☑)?\s*@?(DONE|done|@done|resolved|RESOLVED)\b\s*[:\-]?",
        aliases: &["resolved"],
        color: "#98C379",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "COMPLETE",
        pattern: r"(^|\s)(🏁|🎉|✓✓)?\s*@?(COMPLETE|complete|@complete|finished|FINISHED)\b\s*[:\-]?",
        aliases: &["finished"],
        color: "#98C379",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    // Symbol tags
    Canonical {
        tag: "!",
        pattern: r"(^|\s)!\s*[:\-]?",
        aliases: &[],
        color: "#FF2D00",
        background: None,
        bold: true,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "?",
        pattern: r"(^|\s)\?\s*[:\-]?",
        aliases: &[],
        color: "#3498DB",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "*",
        pattern: r"(^|\s)\*\s*[:\-]?",
        aliases: &[],
        color: "#98C379",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "^",
        pattern: r"(^|\s)\^\s*[:\-]?",
        aliases: &[],
        color: "#f1c40f",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "&",
        pattern: r"(^|\s)&\s*[:\-]?",
        aliases: &[],
        color: "#e91e63",
        background: None,
        bold: false,
        italic: false,
        strikethrough: false,
    },
    Canonical {
        tag: "~",
        pattern: r"(^|\s)~\s*[:\-]?",
        aliases: &[],
        color: "#9b59b6",
        background: None,
        bold: false,
        italic: false,
        strikethrough: true,
    },
];

/// @acp:summary "The default tag table used when none is configured"
pub fn canonical_tags() -> Vec<TagConfig> {
    CANONICAL
        .iter()
        .map(|c| TagConfig {
            tag: c.tag.to_string(),
            pattern: Some(c.pattern.to_string()),
            aliases: c.aliases.iter().map(|a| a.to_string()).collect(),
            presentation: PresentationHints {
                color: c.color.to_string(),
                background_color: c.background.unwrap_or("transparent").to_string(),
                bold: c.bold,
                italic: c.italic,
                strikethrough: c.strikethrough,
                underline: false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_table_has_unique_names() {
        let tags = canonical_tags();
        assert_eq!(tags.len(), 17);

        let mut names: Vec<_> = tags.iter().map(|t| t.tag.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 17);

        for symbol in ["!", "?", "*", "^", "&", "~"] {
            assert!(names.contains(&symbol), "missing symbol tag {}", symbol);
        }
    }

    #[test]
    fn test_effective_pattern_escapes_bare_tag() {
        let tag = TagConfig::new("C++?");
        assert_eq!(tag.effective_pattern(), r"C\+\+\?");

        let blank = TagConfig::new("X").with_pattern("   ");
        assert_eq!(blank.effective_pattern(), "X");
    }

    #[test]
    fn test_tag_config_deserializes_with_defaults() {
        let json = r##"{"tag": "SECURITY", "color": "#ff0000", "bold": true}"##;
        let tag: TagConfig = serde_json::from_str(json).unwrap();

        assert_eq!(tag.tag, "SECURITY");
        assert!(tag.pattern.is_none());
        assert!(tag.aliases.is_empty());
        assert_eq!(tag.presentation.color, "#ff0000");
        assert_eq!(tag.presentation.background_color, "transparent");
        assert!(tag.presentation.bold);
        assert!(!tag.presentation.italic);
    }
}
