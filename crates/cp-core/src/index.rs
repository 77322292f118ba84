//! Connection-target index and incremental pulling.
//!
//! Pulling adds a document's existing properties to a canvas that already
//! shows the document. Values that are already on the canvas (as a card, a
//! link, or a file node) are connected rather than duplicated, and an edge
//! that already exists with the same label is never added twice.

use crate::config::Settings;
use crate::error::CanvasError;
use crate::id::NodeId;
use crate::layout::{COLUMN_OFFSET, MARGIN, choose_sides};
use crate::links::{LinkResolver, resolve_wikilink, wikilink, wikilink_inner};
use crate::model::{Bounds, CanvasGraph, NodeKind, PropertyMap, RawCanvas, RawEdge};
use crate::normalize::build_graph;
use crate::synthesize::value_node;
use std::collections::HashSet;

/// Something on the canvas a property value can connect to.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionTarget {
    pub kind: NodeKind,
    pub id: NodeId,
    /// Card text, link url, or file path.
    pub content: String,
    /// `[[link text]]` for file nodes.
    pub normalized_file_name: Option<String>,
    pub bounds: Bounds,
}

/// Cards, files and urls of one canvas, searchable by value.
///
/// Groups are left out: a group has no stable textual identity to match a
/// property value against.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTargetIndex {
    targets: Vec<ConnectionTarget>,
}

impl ConnectionTargetIndex {
    /// Index `graph`, computing file link text relative to `source`.
    pub fn build(graph: &CanvasGraph, source: &str, links: &dyn LinkResolver) -> Self {
        let cards = graph.cards.iter().map(|c| ConnectionTarget {
            kind: NodeKind::Card,
            id: c.id,
            content: c.text.clone(),
            normalized_file_name: None,
            bounds: c.bounds,
        });
        let files = graph.files.iter().map(|f| ConnectionTarget {
            kind: NodeKind::File,
            id: f.id,
            content: f.path.clone(),
            normalized_file_name: Some(wikilink(links, &f.path, None, source)),
            bounds: f.bounds,
        });
        let urls = graph.urls.iter().map(|u| ConnectionTarget {
            kind: NodeKind::Url,
            id: u.id,
            content: u.url.clone(),
            normalized_file_name: None,
            bounds: u.bounds,
        });

        Self {
            targets: cards.chain(files).chain(urls).collect(),
        }
    }

    pub fn targets(&self) -> &[ConnectionTarget] {
        &self.targets
    }

    pub fn push(&mut self, target: ConnectionTarget) {
        self.targets.push(target);
    }

    /// First target whose content or normalized file name equals `value`.
    pub fn find(&self, value: &str) -> Option<&ConnectionTarget> {
        self.targets.iter().find(|t| {
            t.content == value || t.normalized_file_name.as_deref() == Some(value)
        })
    }

    /// Like [`find`](Self::find), but a wikilink that names a file node by a
    /// different spelling (alias, subpath, full path) also matches.
    pub fn find_value(
        &self,
        value: &str,
        source: &str,
        links: &dyn LinkResolver,
    ) -> Option<&ConnectionTarget> {
        if let Some(hit) = self.find(value) {
            return Some(hit);
        }
        let inner = wikilink_inner(value)?;
        let resolved = resolve_wikilink(links, inner, source);
        if resolved.broken {
            return None;
        }
        self.targets
            .iter()
            .find(|t| t.kind == NodeKind::File && t.content == resolved.path)
    }
}

/// Result of pulling a document's properties onto a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PullOutcome {
    pub canvas: RawCanvas,
    pub nodes_added: usize,
    pub edges_added: usize,
    /// Values with no match on the canvas, left out in existing-only mode.
    pub skipped: usize,
}

impl PullOutcome {
    pub fn changed(&self) -> bool {
        self.nodes_added > 0 || self.edges_added > 0
    }
}

type EdgeKey = (NodeId, NodeId, Option<String>);

/// Add `properties` of the document at `document` to `canvas`.
///
/// Returns `Ok(None)` when the document has no node on the canvas. With
/// `existing_only`, values not already on the canvas are skipped instead of
/// getting a new node.
///
/// # Errors
/// Any error from building the canvas graph.
pub fn pull_properties(
    canvas: &RawCanvas,
    document: &str,
    properties: &PropertyMap,
    settings: &Settings,
    links: &dyn LinkResolver,
    existing_only: bool,
) -> Result<Option<PullOutcome>, CanvasError> {
    let graph = build_graph(canvas)?;
    let Some(anchor) = graph.files_for_path(document).next() else {
        return Ok(None);
    };
    let anchor_id = anchor.id;
    let anchor_bounds = anchor.bounds;

    let mut index = ConnectionTargetIndex::build(&graph, document, links);
    let mut existing: HashSet<EdgeKey> = canvas
        .edges
        .iter()
        .map(|e| (e.from_node, e.to_node, e.label.clone()))
        .collect();

    let mut out = canvas.clone();
    let mut nodes_added = 0;
    let mut edges_added = 0;
    let mut skipped = 0;
    let new_x = anchor_bounds.x + COLUMN_OFFSET;
    let mut new_y = anchor_bounds.y;

    for (key, values) in properties {
        if settings.is_excluded(key) {
            continue;
        }
        for value in values {
            let target = match index.find_value(value, document, links) {
                Some(hit) => (hit.id, hit.bounds),
                None if existing_only => {
                    skipped += 1;
                    continue;
                }
                None => {
                    let (node, broken) = value_node(value, new_x, new_y, document, links);
                    if broken {
                        log::warn!("{document}: `{key}` value {value} does not resolve");
                    }
                    let bounds = node.bounds();
                    new_y += bounds.height + MARGIN;
                    index.push(ConnectionTarget {
                        kind: kind_of_new(&node.kind),
                        id: node.id,
                        content: node
                            .file
                            .clone()
                            .or_else(|| node.text.clone())
                            .or_else(|| node.url.clone())
                            .unwrap_or_else(|| value.clone()),
                        normalized_file_name: node
                            .file
                            .as_deref()
                            .map(|path| wikilink(links, path, None, document)),
                        bounds,
                    });
                    let id = node.id;
                    out.nodes.push(node);
                    nodes_added += 1;
                    (id, bounds)
                }
            };

            let (target_id, target_bounds) = target;
            if target_id == anchor_id {
                continue;
            }
            let edge_key = (anchor_id, target_id, Some(key.clone()));
            if existing.contains(&edge_key) {
                continue;
            }

            let (from_side, to_side) = choose_sides(&anchor_bounds, &target_bounds);
            out.edges.push(RawEdge::new(
                NodeId::generate(),
                (anchor_id, from_side),
                (target_id, to_side),
                Some(key.clone()),
            ));
            existing.insert(edge_key);
            edges_added += 1;
        }
    }

    log::debug!(
        "pulled {document}: {nodes_added} nodes, {edges_added} edges, {skipped} skipped"
    );
    Ok(Some(PullOutcome {
        canvas: out,
        nodes_added,
        edges_added,
        skipped,
    }))
}

fn kind_of_new(node_type: &str) -> NodeKind {
    match node_type {
        crate::model::node_type::FILE => NodeKind::File,
        crate::model::node_type::LINK => NodeKind::Url,
        _ => NodeKind::Card,
    }
}
