//! Graph ingest: raw canvas JSON → typed node collections.
//!
//! Nodes are partitioned by their `type` discriminator. Nothing is validated
//! here beyond the discriminator; edges pointing at nodes of an unknown type
//! are only rejected later, when endpoints are resolved.

use crate::error::CanvasError;
use crate::model::{
    CardNode, FileNode, GroupNode, RawCanvas, RawEdge, RawNode, UrlNode, node_type,
};
use smallvec::SmallVec;

/// First pipeline stage: typed nodes, edges still raw, no containment yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    pub cards: Vec<CardNode>,
    pub files: Vec<FileNode>,
    pub urls: Vec<UrlNode>,
    pub groups: Vec<GroupNode>,
    pub edges: Vec<RawEdge>,
}

/// Decode a canvas file. Blank input decodes to an empty canvas.
///
/// # Errors
/// Returns [`CanvasError::Json`] when the text is not a canvas document.
pub fn parse_canvas(text: &str) -> Result<RawCanvas, CanvasError> {
    if text.trim().is_empty() {
        return Ok(RawCanvas::default());
    }
    Ok(serde_json::from_str(text)?)
}

/// Partition raw nodes into typed collections. Unknown types are dropped.
#[must_use]
pub fn ingest(canvas: &RawCanvas) -> Ingested {
    let mut out = Ingested {
        edges: canvas.edges.clone(),
        ..Default::default()
    };

    for node in &canvas.nodes {
        match node.kind.as_str() {
            node_type::TEXT => out.cards.push(CardNode {
                id: node.id,
                text: field(&node.text),
                bounds: node.bounds(),
            }),
            node_type::FILE => out.files.push(FileNode {
                id: node.id,
                path: field(&node.file),
                subpath: node.subpath.clone().filter(|s| !s.is_empty()),
                bounds: node.bounds(),
                in_groups: SmallVec::new(),
            }),
            node_type::LINK => out.urls.push(UrlNode {
                id: node.id,
                url: field(&node.url),
                bounds: node.bounds(),
            }),
            node_type::GROUP => out.groups.push(GroupNode {
                id: node.id,
                label: field(&node.label),
                bounds: node.bounds(),
                contained: Vec::new(),
            }),
            other => log_skipped(node, other),
        }
    }

    log::debug!(
        "ingested {} cards, {} files, {} urls, {} groups, {} edges",
        out.cards.len(),
        out.files.len(),
        out.urls.len(),
        out.groups.len(),
        out.edges.len()
    );
    out
}

fn field(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn log_skipped(node: &RawNode, kind: &str) {
    log::trace!("skipping node {} of unknown type `{kind}`", node.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CANVAS: &str = r##"{
        "nodes": [
            {"id":"c1","type":"text","text":"hello","x":0,"y":0,"width":250,"height":60},
            {"id":"f1","type":"file","file":"notes/doc.md","subpath":"#Intro","x":0,"y":100,"width":400,"height":400},
            {"id":"u1","type":"link","url":"https://example.com","x":500,"y":0,"width":400,"height":400},
            {"id":"g1","type":"group","label":"Inbox","x":-20,"y":-20,"width":1000,"height":600},
            {"id":"w1","type":"widget","x":0,"y":0,"width":1,"height":1}
        ],
        "edges": [
            {"id":"e1","fromNode":"f1","toNode":"c1"}
        ]
    }"##;

    #[test]
    fn partitions_by_type() {
        let raw = parse_canvas(CANVAS).unwrap();
        let ingested = ingest(&raw);

        assert_eq!(ingested.cards.len(), 1);
        assert_eq!(ingested.cards[0].text, "hello");
        assert_eq!(ingested.files.len(), 1);
        assert_eq!(ingested.files[0].path, "notes/doc.md");
        assert_eq!(ingested.files[0].subpath.as_deref(), Some("#Intro"));
        assert!(ingested.files[0].in_groups.is_empty());
        assert_eq!(ingested.urls[0].url, "https://example.com");
        assert_eq!(ingested.groups[0].label, "Inbox");
        assert!(ingested.groups[0].contained.is_empty());
        assert_eq!(ingested.edges.len(), 1);
    }

    #[test]
    fn unknown_types_are_dropped_silently() {
        let raw = parse_canvas(CANVAS).unwrap();
        let ingested = ingest(&raw);
        let total = ingested.cards.len()
            + ingested.files.len()
            + ingested.urls.len()
            + ingested.groups.len();
        assert_eq!(total, 4);
    }

    #[test]
    fn blank_text_is_an_empty_canvas() {
        assert!(parse_canvas("  \n").unwrap().is_empty());
        assert!(parse_canvas("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_canvas("{\"nodes\": ["),
            Err(CanvasError::Json(_))
        ));
    }

    #[test]
    fn missing_group_label_becomes_empty() {
        let raw = parse_canvas(
            r#"{"nodes":[{"id":"g","type":"group","x":0,"y":0,"width":10,"height":10}]}"#,
        )
        .unwrap();
        assert_eq!(ingest(&raw).groups[0].label, "");
    }
}
