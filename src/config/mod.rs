//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::language::{CommentConfiguration, ProfileResolver};
use crate::query::TagFilter;
use crate::span::LocateOptions;
use crate::tags::{canonical_tags, TagConfig};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".commentcraft.json";

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_index_delay_ms() -> u64 {
    500
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_reminder_interval_minutes() -> u64 {
    60
}

fn default_reminder_days_threshold() -> u32 {
    7
}

/// @acp:summary "Main configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Master switch for scanning and highlighting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Scan `plaintext` documents, where every line is candidate text
    #[serde(default)]
    pub highlight_plain_text: bool,

    /// Block and embedded comments
    #[serde(default = "default_true")]
    pub multiline_comments: bool,

    /// Documentation comments for languages that have them
    #[serde(default = "default_true")]
    pub highlight_doc_comments: bool,

    /// Index path: only keep matches preceded by the language's comment prefix
    #[serde(default = "default_true")]
    pub match_only_in_comments: bool,

    /// Ordered tag table
    #[serde(default = "canonical_tags")]
    pub tags: Vec<TagConfig>,

    /// Comment syntax overrides keyed by language identifier
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub languages: HashMap<String, CommentConfiguration>,

    /// Quiet period after the last edit before a document is rescanned
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Trailing delay of the index refresh queue
    #[serde(default = "default_index_delay_ms")]
    pub index_delay_ms: u64,

    /// File patterns to include (glob syntax)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Files larger than this are skipped by workspace indexing
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Named filters usable from `search --filter`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_filters: Vec<SavedFilter>,

    /// Report urgent and overdue tags from `remind`
    #[serde(default)]
    pub enable_reminders: bool,

    /// Pause between reports of `remind --repeat`
    #[serde(default = "default_reminder_interval_minutes")]
    pub reminder_interval_minutes: u64,

    /// Age in days after which a dated TODO is overdue
    #[serde(default = "default_reminder_days_threshold")]
    pub reminder_days_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            highlight_plain_text: false,
            multiline_comments: true,
            highlight_doc_comments: true,
            match_only_in_comments: true,
            tags: canonical_tags(),
            languages: HashMap::new(),
            debounce_ms: default_debounce_ms(),
            index_delay_ms: default_index_delay_ms(),
            include: default_include(),
            exclude: default_exclude(),
            max_file_size_mb: default_max_file_size_mb(),
            saved_filters: Vec::new(),
            enable_reminders: false,
            reminder_interval_minutes: default_reminder_interval_minutes(),
            reminder_days_threshold: default_reminder_days_threshold(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or fall back to defaults"
    pub fn load_or_default() -> Self {
        match Self::load(CONFIG_FILE) {
            Ok(config) => config,
            Err(crate::CraftError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    /// Which comment strategies the locator runs
    pub fn locate_options(&self) -> LocateOptions {
        LocateOptions {
            multiline: self.multiline_comments,
            doc_comments: self.highlight_doc_comments,
        }
    }

    /// Resolver over the builtin table plus configured language overrides
    pub fn resolver(&self) -> ProfileResolver {
        ProfileResolver::with_overrides(self.languages.clone(), self.highlight_plain_text)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn index_delay(&self) -> Duration {
        Duration::from_millis(self.index_delay_ms)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_minutes.saturating_mul(60))
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn saved_filter(&self, name: &str) -> Option<&TagFilter> {
        self.saved_filters
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.options)
    }

    /// Store a filter under `name`, replacing any filter with that name
    pub fn save_filter(&mut self, name: &str, options: TagFilter) {
        self.saved_filters.retain(|f| f.name != name);
        self.saved_filters.push(SavedFilter {
            name: name.to_string(),
            options,
        });
    }
}

/// @acp:summary "A named, persisted search filter"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub name: String,
    pub options: TagFilter,
}

fn default_include() -> Vec<String> {
    [
        "ts", "tsx", "js", "jsx", "mjs", "cjs", "rs", "py", "go", "java", "kt", "swift", "c", "h",
        "cpp", "hpp", "cc", "cs", "php", "rb", "lua", "sh", "css", "scss", "less", "html", "vue",
        "sql", "yaml", "yml", "toml",
    ]
    .iter()
    .map(|ext| format!("**/*.{}", ext))
    .collect()
}

fn default_exclude() -> Vec<String> {
    vec![
        // Package managers
        "**/node_modules/**".to_string(),
        "**/vendor/**".to_string(),
        // Build outputs
        "**/dist/**".to_string(),
        "**/build/**".to_string(),
        "**/target/**".to_string(),
        "**/out/**".to_string(),
        // Cache/temp
        "**/.cache/**".to_string(),
        "**/coverage/**".to_string(),
        "**/__pycache__/**".to_string(),
        // VCS
        "**/.git/**".to_string(),
    ]
}
