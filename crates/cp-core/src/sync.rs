//! Synchronization runs: push canvas connections into documents, synthesize
//! a canvas from a document, and pull a document's properties onto a canvas.
//!
//! Each run works on one in-memory snapshot. Documents are read and written
//! through a [`DocumentStore`]; everything else is pure.

use crate::config::Settings;
use crate::derive::derive_properties;
use crate::error::{CanvasError, StoreError};
use crate::index::pull_properties;
use crate::ingest::parse_canvas;
use crate::links::LinkResolver;
use crate::merge::{WriteMode, merge_results};
use crate::model::{PropertyMap, RawCanvas};
use crate::normalize::build_graph;
use crate::synthesize::{canvas_output_path, synthesize_canvas};
use std::fmt;

/// Where documents live.
///
/// Implemented by each host environment:
/// - CLI: a vault directory of markdown files with YAML front matter
/// - tests: an in-memory map
pub trait DocumentStore: LinkResolver {
    /// The document's list-typed properties, or `None` if it does not exist.
    fn properties(&self, path: &str) -> Option<PropertyMap>;

    /// Write `updates` into the document. Returns whether it changed.
    fn update_properties(
        &mut self,
        path: &str,
        updates: &PropertyMap,
        mode: WriteMode,
    ) -> Result<bool, StoreError>;

    /// Whether `folder` (vault-relative, no trailing slash) exists.
    fn folder_exists(&self, folder: &str) -> bool;
}

/// A non-error reason a run did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoCanvasData,
    NoConnections,
    NoChanges,
    NotOnCanvas { path: String },
    NoListProperties { path: String },
    WrongFileType { path: String, expected: &'static str },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoCanvasData => write!(f, "No canvas data found"),
            Notice::NoConnections => write!(f, "No connections found"),
            Notice::NoChanges => write!(f, "No changes"),
            Notice::NotOnCanvas { path } => write!(f, "{path} is not on this canvas"),
            Notice::NoListProperties { path } => {
                write!(f, "{path} has no list properties")
            }
            Notice::WrongFileType { path, expected } => {
                write!(f, "{path} is not a {expected} file")
            }
        }
    }
}

/// Either a finished run or the notice explaining why nothing happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Notice(Notice),
}

impl<T> Outcome<T> {
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Notice(_) => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Notice(notice) => Some(notice),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Keys sent to documents that changed, counting keys whose values were
    /// already up to date.
    pub keys_written: usize,
    /// Paths of documents that changed, in canvas order.
    pub modified: Vec<String>,
    /// Documents on the canvas the store does not have.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    pub canvas: RawCanvas,
    pub path: String,
    /// Set when the configured folder is missing and the root is used.
    pub warning: Option<String>,
    pub broken_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullReport {
    pub canvas: RawCanvas,
    pub nodes_added: usize,
    pub edges_added: usize,
    pub skipped: usize,
}

fn load(canvas_json: &str) -> Result<Option<RawCanvas>, CanvasError> {
    let canvas = parse_canvas(canvas_json)?;
    Ok((!canvas.is_empty()).then_some(canvas))
}

fn without_excluded(mut properties: PropertyMap, settings: &Settings) -> PropertyMap {
    properties.retain(|key, values| !settings.is_excluded(key) && !values.is_empty());
    properties
}

/// Write every document's canvas-implied properties.
///
/// # Errors
/// Any [`CanvasError`]; store failures other than a missing document abort
/// the run, but documents already written stay written.
pub fn push<S: DocumentStore>(
    canvas_json: &str,
    store: &mut S,
    settings: &Settings,
    mode: WriteMode,
) -> Result<Outcome<PushReport>, CanvasError> {
    let Some(canvas) = load(canvas_json)? else {
        return Ok(Outcome::Notice(Notice::NoCanvasData));
    };
    let graph = build_graph(&canvas)?;

    let mut results = Vec::with_capacity(graph.files.len());
    for file in &graph.files {
        let derived = derive_properties(file, &graph, settings, &*store)?;
        results.push((file.path.as_str(), derived));
    }

    let merged = merge_results(results, settings);
    if merged.is_empty() {
        return Ok(Outcome::Notice(Notice::NoConnections));
    }

    let mut report = PushReport::default();
    for (path, properties) in &merged {
        match store.update_properties(path, properties, mode) {
            Ok(true) => {
                log::info!("updated {path}: {} keys", properties.len());
                report.keys_written += properties.len();
                report.modified.push(path.clone());
            }
            Ok(false) => log::debug!("{path} already up to date"),
            Err(StoreError::NotFound(_)) => {
                log::warn!("{path} is on the canvas but not in the vault");
                report.missing.push(path.clone());
            }
            Err(err) => return Err(err.into()),
        }
    }

    if report.modified.is_empty() {
        return Ok(Outcome::Notice(Notice::NoChanges));
    }
    Ok(Outcome::Done(report))
}

/// Lay out a new canvas from the document at `path`.
pub fn synthesize<S: DocumentStore>(
    path: &str,
    store: &S,
    settings: &Settings,
) -> Outcome<SynthesisReport> {
    let properties = without_excluded(store.properties(path).unwrap_or_default(), settings);
    if properties.is_empty() {
        return Outcome::Notice(Notice::NoListProperties {
            path: path.to_string(),
        });
    }

    let synthesis = synthesize_canvas(path, &properties, store);
    let (output, warning) = canvas_output_path(path, settings, |folder| store.folder_exists(folder));
    for link in &synthesis.broken_links {
        log::warn!("{path}: {link} does not resolve, kept as written");
    }

    Outcome::Done(SynthesisReport {
        canvas: synthesis.canvas,
        path: output,
        warning,
        broken_links: synthesis.broken_links,
    })
}

/// Add the properties of the document at `path` to a canvas that shows it.
///
/// # Errors
/// Any [`CanvasError`] from reading the canvas.
pub fn pull<S: DocumentStore>(
    canvas_json: &str,
    path: &str,
    store: &S,
    settings: &Settings,
    existing_only: bool,
) -> Result<Outcome<PullReport>, CanvasError> {
    let Some(canvas) = load(canvas_json)? else {
        return Ok(Outcome::Notice(Notice::NoCanvasData));
    };
    let properties = without_excluded(store.properties(path).unwrap_or_default(), settings);
    if properties.is_empty() {
        return Ok(Outcome::Notice(Notice::NoListProperties {
            path: path.to_string(),
        }));
    }

    let Some(outcome) =
        pull_properties(&canvas, path, &properties, settings, store, existing_only)?
    else {
        return Ok(Outcome::Notice(Notice::NotOnCanvas {
            path: path.to_string(),
        }));
    };
    if !outcome.changed() {
        return Ok(Outcome::Notice(Notice::NoChanges));
    }

    Ok(Outcome::Done(PullReport {
        canvas: outcome.canvas,
        nodes_added: outcome.nodes_added,
        edges_added: outcome.edges_added,
        skipped: outcome.skipped,
    }))
}
