//! Filesystem host for `cp-core`: a vault directory of markdown documents
//! with YAML front matter, plus settings loading.

pub mod frontmatter;
pub mod settings;
pub mod vault;

pub use settings::{SETTINGS_FILE, SettingsError, load_settings};
pub use vault::{CANVAS_EXTENSION, MARKDOWN_EXTENSION, Vault};
