//! YAML front matter of markdown documents.
//!
//! A document starts with front matter when its first line is `---`; the
//! block runs to the next line that is exactly `---` (or `...`). Only the
//! keys this tool writes are touched; every other key and the body are kept.

use cp_core::PropertyMap;
use serde_yaml::{Mapping, Value};

/// A markdown document split into front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub fields: Mapping,
    pub body: String,
}

/// `(yaml, body)` if `text` starts with a front matter block.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

impl Document {
    /// Parse `text`. A document without front matter has empty fields.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        let Some((yaml, body)) = split(text) else {
            return Ok(Self {
                fields: Mapping::new(),
                body: text.to_string(),
            });
        };

        let fields = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml)? {
                Value::Mapping(map) => map,
                Value::Null => Mapping::new(),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "front matter is not a mapping: {other:?}"
                    )));
                }
            }
        };

        Ok(Self {
            fields,
            body: body.to_string(),
        })
    }

    /// Keys whose value is a list of scalars, each value as a string.
    pub fn list_properties(&self) -> PropertyMap {
        self.fields
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                let Value::Sequence(items) = value else {
                    return None;
                };
                Some((key.to_string(), items.iter().filter_map(scalar).collect()))
            })
            .collect()
    }

    /// Current values of `key` for merging: a list as is, a lone scalar as a
    /// one-element list, anything else as empty.
    pub fn values(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar).collect(),
            Some(value) => scalar(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn set_list(&mut self, key: &str, values: &[String]) {
        let items = values.iter().cloned().map(Value::String).collect();
        self.fields
            .insert(Value::String(key.to_string()), Value::Sequence(items));
    }

    /// Render back to markdown.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        if self.fields.is_empty() {
            return Ok(self.body.clone());
        }
        let yaml = serde_yaml::to_string(&self.fields)?;
        Ok(format!("---\n{yaml}---\n{}", self.body))
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
