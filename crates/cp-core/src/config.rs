//! User settings that steer property derivation and canvas synthesis.

use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Where a synthesized canvas is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewFileLocation {
    /// Vault root.
    #[default]
    Root,
    /// Next to the source note.
    SameFolder,
    /// `custom_file_location`, or the root when that folder is missing.
    Custom,
}

/// Settings, stored as camelCase JSON. Every field has a default, so a
/// partial settings file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Edges to text cards contribute properties. Default: **true**.
    pub use_cards: bool,
    /// Edges to web links contribute properties. Default: **true**.
    pub use_urls: bool,
    /// Edges to other notes contribute properties. Default: **true**.
    pub use_files: bool,
    /// Containing groups contribute a property. Default: **true**.
    pub use_groups: bool,

    pub card_default: String,
    pub url_default: String,
    pub file_default: String,
    pub group_default: String,

    /// Comma-separated, case-insensitive property keys the canvas never
    /// writes and never pulls.
    pub exclude_keys: String,

    pub new_file_location: NewFileLocation,
    pub custom_file_location: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_cards: true,
            use_urls: true,
            use_files: true,
            use_groups: true,
            card_default: "cards".into(),
            url_default: "urls".into(),
            file_default: "files".into(),
            group_default: "groups".into(),
            exclude_keys: String::new(),
            new_file_location: NewFileLocation::Root,
            custom_file_location: String::new(),
        }
    }
}

impl Settings {
    /// The parsed exclusion list, trimmed and lowercased.
    pub fn excluded_keys(&self) -> Vec<String> {
        self.exclude_keys
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.excluded_keys().iter().any(|k| *k == key)
    }
}
