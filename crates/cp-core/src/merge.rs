//! Merging derived properties per document, and applying them to the
//! properties a document already has.

use crate::config::Settings;
use crate::model::{DerivedResult, PropertyMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How new values combine with a document's existing values for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace the key's values.
    #[default]
    Overwrite,
    /// Keep existing values, add new distinct ones after them.
    Append,
}

/// Fold per-node results into one map per document path.
///
/// A document shown by several nodes gets the key-wise concatenation of
/// their maps, first node's keys first. `None` results contribute nothing.
/// Excluded keys are removed and documents left with nothing are dropped.
pub fn merge_results<'a, I>(results: I, settings: &Settings) -> IndexMap<String, PropertyMap>
where
    I: IntoIterator<Item = (&'a str, DerivedResult)>,
{
    let mut merged: IndexMap<String, PropertyMap> = IndexMap::new();

    for (path, result) in results {
        let Some(map) = result else { continue };
        let doc = merged.entry(path.to_string()).or_default();
        for (key, values) in map {
            if settings.is_excluded(&key) {
                log::debug!("{path}: skipping excluded key `{key}`");
                continue;
            }
            doc.entry(key).or_default().extend(values);
        }
    }

    merged.retain(|_, map| {
        map.retain(|_, values| !values.is_empty());
        !map.is_empty()
    });
    merged
}

/// The values a key ends up with after writing `new` over `existing`.
///
/// Overwrite takes `new` as is; append adds each value not already present.
pub fn merge_values(existing: &[String], new: &[String], mode: WriteMode) -> Vec<String> {
    if mode == WriteMode::Overwrite {
        return new.to_vec();
    }
    let mut out = existing.to_vec();
    for value in new {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

/// Apply `updates` to a document's list properties. Returns true if anything
/// changed.
pub fn apply_update(existing: &mut PropertyMap, updates: &PropertyMap, mode: WriteMode) -> bool {
    let mut changed = false;
    for (key, values) in updates {
        let current = existing.get(key).map(Vec::as_slice).unwrap_or_default();
        let next = merge_values(current, values, mode);
        if existing.get(key) != Some(&next) {
            existing.insert(key.clone(), next);
            changed = true;
        }
    }
    changed
}
