//! Edge normalization: bidirectionality and phantom edges.
//!
//! An edge that targets a group is treated as if it also targeted every
//! non-group member of that group. Those synthesized edges ("phantoms") are
//! appended after the real edges and are indistinguishable downstream.

use crate::containment::{Contained, resolve_containment};
use crate::error::CanvasError;
use crate::ingest::ingest;
use crate::model::{
    CanvasGraph, Edge, EndKind, NodeKind, RawCanvas, RawEdge, Side, kind_of,
};

/// Side hints for phantom edges. Only label and connectivity matter downstream.
const PHANTOM_FROM_SIDE: Side = Side::Right;
const PHANTOM_TO_SIDE: Side = Side::Left;

/// `fromEnd == arrow || toEnd == none`. Missing markers match neither.
pub fn is_bidirectional(edge: &RawEdge) -> bool {
    edge.from_end == Some(EndKind::Arrow) || edge.to_end == Some(EndKind::None)
}

/// Final pipeline stage.
///
/// # Errors
/// [`CanvasError::UnresolvedEndpoint`] if any edge endpoint is not a card,
/// file, url or group on this canvas.
pub fn normalize_edges(contained: Contained) -> Result<CanvasGraph, CanvasError> {
    let Contained {
        cards,
        files,
        urls,
        groups,
        edges: raw_edges,
    } = contained;

    let resolve = |edge: &RawEdge, node| {
        kind_of(&cards, &files, &urls, &groups, node)
            .ok_or(CanvasError::UnresolvedEndpoint {
                edge: edge.id,
                node,
            })
    };

    let mut edges = Vec::with_capacity(raw_edges.len());
    let mut phantoms = Vec::new();

    for raw in &raw_edges {
        resolve(raw, raw.from_node)?;
        let target_kind = resolve(raw, raw.to_node)?;

        let edge = Edge {
            id: raw.id,
            from_node: raw.from_node,
            to_node: raw.to_node,
            from_side: raw.from_side,
            to_side: raw.to_side,
            label: raw.label.clone(),
            is_bidirectional: is_bidirectional(raw),
        };

        if target_kind == NodeKind::Group
            && let Some(group) = groups.iter().find(|g| g.id == raw.to_node)
        {
            let label = edge.label.clone().unwrap_or_else(|| group.label.clone());
            for member in group.contained.iter().filter(|m| m.kind != NodeKind::Group) {
                phantoms.push(Edge {
                    id: edge.id.phantom(),
                    from_node: edge.from_node,
                    to_node: member.id,
                    from_side: Some(PHANTOM_FROM_SIDE),
                    to_side: Some(PHANTOM_TO_SIDE),
                    label: Some(label.clone()),
                    is_bidirectional: edge.is_bidirectional,
                });
            }
        }

        edges.push(edge);
    }

    log::debug!(
        "normalized {} edges, {} phantom edges",
        edges.len(),
        phantoms.len()
    );
    edges.extend(phantoms);

    Ok(CanvasGraph {
        cards,
        files,
        urls,
        groups,
        edges,
    })
}

/// Run the whole pipeline: ingest → containment → normalization.
///
/// # Errors
/// See [`normalize_edges`].
pub fn build_graph(canvas: &RawCanvas) -> Result<CanvasGraph, CanvasError> {
    normalize_edges(resolve_containment(ingest(canvas)))
}
