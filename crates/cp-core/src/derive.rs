//! Property derivation for a single file node.
//!
//! A document's canvas-implied properties come from two places: the groups
//! its node sits in, and the edges leaving it (or entering it, when the edge
//! is bidirectional). A bidirectional edge into a containing group reaches
//! the node as well.

use crate::config::Settings;
use crate::error::CanvasError;
use crate::id::NodeId;
use crate::links::{LinkResolver, wikilink};
use crate::model::{CanvasGraph, DerivedResult, Edge, FileNode, NodeKind, NodeRef, PropertyMap};

/// One value contributed by one edge, before category gating.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Contribution {
    kind: NodeKind,
    label: String,
    value: String,
}

/// Edges that say something about `file`.
pub fn relevant_edges<'g>(file: &FileNode, graph: &'g CanvasGraph) -> Vec<&'g Edge> {
    let relevant = |id: NodeId| id == file.id || file.in_groups.contains(&id);
    graph
        .edges
        .iter()
        .filter(|e| relevant(e.from_node) || (relevant(e.to_node) && e.is_bidirectional))
        .collect()
}

/// Derive the property map implied by `file`'s connections.
///
/// Returns `Ok(None)` when the node has no relevant edges and no groups.
///
/// # Errors
/// [`CanvasError::OtherSideNotFound`] when an edge's far endpoint is not on
/// the canvas.
pub fn derive_properties(
    file: &FileNode,
    graph: &CanvasGraph,
    settings: &Settings,
    links: &dyn LinkResolver,
) -> Result<DerivedResult, CanvasError> {
    let edges = relevant_edges(file, graph);
    if edges.is_empty() && file.in_groups.is_empty() {
        return Ok(None);
    }

    let mut contributions = Vec::with_capacity(edges.len());
    for edge in edges {
        if let Some(c) = contribution(file, edge, graph, settings, links)?
            && !c.label.is_empty()
        {
            contributions.push(c);
        }
    }

    let mut result = PropertyMap::new();

    if settings.use_groups && !file.in_groups.is_empty() {
        let labels = file
            .in_groups
            .iter()
            .filter_map(|id| graph.group(*id))
            .map(|g| g.label.clone())
            .collect();
        result.insert(settings.group_default.clone(), labels);
    }

    for c in contributions {
        let enabled = match c.kind {
            NodeKind::Card => settings.use_cards,
            NodeKind::Url => settings.use_urls,
            NodeKind::File => settings.use_files,
            NodeKind::Group => false,
        };
        if enabled {
            result.entry(c.label).or_default().push(c.value);
        }
    }

    log::trace!("derived {} keys for {}", result.len(), file.path);
    Ok(Some(result))
}

fn contribution(
    file: &FileNode,
    edge: &Edge,
    graph: &CanvasGraph,
    settings: &Settings,
    links: &dyn LinkResolver,
) -> Result<Option<Contribution>, CanvasError> {
    let other_id = if edge.from_node == file.id {
        edge.to_node
    } else {
        edge.from_node
    };
    let other = graph
        .other_side(other_id)
        .ok_or(CanvasError::OtherSideNotFound {
            edge: edge.id,
            node: other_id,
        })?;

    let (kind, value, default_label) = match other {
        NodeRef::Card(card) => (NodeKind::Card, card.text.clone(), &settings.card_default),
        NodeRef::Url(url) => (NodeKind::Url, url.url.clone(), &settings.url_default),
        NodeRef::File(target) => (
            NodeKind::File,
            wikilink(links, &target.path, target.subpath.as_deref(), &file.path),
            &settings.file_default,
        ),
        // Group targets were expanded into phantom edges already.
        NodeRef::Group(_) => return Ok(None),
    };

    let label = match edge.label.as_deref() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default_label.clone(),
    };

    Ok(Some(Contribution { kind, label, value }))
}
