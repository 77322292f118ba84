//! A vault: a directory of markdown documents and canvas files.

use crate::frontmatter::Document;
use cp_core::links::{LinkResolver, PathIndex};
use cp_core::merge::apply_update;
use cp_core::sync::DocumentStore;
use cp_core::{PropertyMap, StoreError, WriteMode};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const MARKDOWN_EXTENSION: &str = "md";
pub const CANVAS_EXTENSION: &str = "canvas";

/// Documents are addressed by vault-relative, `/`-separated paths.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    index: PathIndex,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn to_vault_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

impl Vault {
    /// Index every file under `root`, skipping hidden files and folders.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let mut paths = Vec::new();

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.map_err(|err| StoreError::Io {
                path: root.display().to_string(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&root)
                && let Some(path) = to_vault_path(relative)
            {
                paths.push(path);
            }
        }

        log::debug!("indexed {} files in {}", paths.len(), root.display());
        Ok(Self {
            root,
            index: PathIndex::new(paths),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> &[String] {
        self.index.paths()
    }

    /// Vault path for a path given on the command line: absolute paths must
    /// lie inside the vault, relative ones are taken from the vault root.
    pub fn vault_path(&self, path: &Path) -> Option<String> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?
        } else {
            path
        };
        to_vault_path(relative).filter(|p| !p.is_empty())
    }

    /// Location on disk of a vault path. `None` for paths that could leave
    /// the vault: `..`, rooted or drive-prefixed components.
    pub fn absolute(&self, path: &str) -> Option<PathBuf> {
        to_vault_path(Path::new(path))?;
        Some(path.split('/').fold(self.root.clone(), |acc, part| acc.join(part)))
    }

    fn checked(&self, path: &str) -> Result<PathBuf, StoreError> {
        self.absolute(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    pub fn read(&self, path: &str) -> Result<String, StoreError> {
        fs::read_to_string(self.checked(path)?).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_string())
            } else {
                StoreError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }

    /// Write `contents`, creating parent folders, and add the path to the
    /// index if it is new.
    pub fn write(&mut self, path: &str, contents: &str) -> Result<(), StoreError> {
        let target = self.checked(path)?;
        let io = |source| StoreError::Io {
            path: path.to_string(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(&target, contents).map_err(io)?;

        if !self.index.contains(path) {
            let mut paths = self.index.paths().to_vec();
            paths.push(path.to_string());
            self.index = PathIndex::new(paths);
        }
        Ok(())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.absolute(path).is_some_and(|target| target.exists())
    }

    fn document(&self, path: &str) -> Result<Document, StoreError> {
        let text = self.read(path)?;
        Document::parse(&text).map_err(|err| StoreError::Malformed {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}

impl LinkResolver for Vault {
    fn link_text(&self, target: &str, source: &str) -> String {
        self.index.link_text(target, source)
    }

    fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        self.index.resolve_link(link, source)
    }
}

impl DocumentStore for Vault {
    fn properties(&self, path: &str) -> Option<PropertyMap> {
        match self.document(path) {
            Ok(doc) => Some(doc.list_properties()),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    fn update_properties(
        &mut self,
        path: &str,
        updates: &PropertyMap,
        mode: WriteMode,
    ) -> Result<bool, StoreError> {
        let mut doc = self.document(path)?;
        let mut current: PropertyMap = updates
            .keys()
            .map(|key| (key.clone(), doc.values(key)))
            .collect();

        if !apply_update(&mut current, updates, mode) {
            return Ok(false);
        }
        for (key, values) in &current {
            doc.set_list(key, values);
        }

        let text = doc.render().map_err(|err| StoreError::Malformed {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        self.write(path, &text)?;
        Ok(true)
    }

    fn folder_exists(&self, folder: &str) -> bool {
        self.absolute(folder).is_some_and(|target| target.is_dir())
    }
}
