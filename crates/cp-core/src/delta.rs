//! Edge delta tracking for one open canvas.
//!
//! The host calls [`EdgeDeltaTracker::reset`] when a canvas is opened and
//! [`EdgeDeltaTracker::observe`] on every write; the delta tells it which
//! documents need their properties re-derived.

use crate::id::NodeId;
use crate::model::{CanvasGraph, Edge, NodeRef};
use indexmap::IndexSet;

/// Identity of an edge for delta purposes. Edge ids are ignored so that an
/// edge deleted and redrawn between the same nodes with the same label is
/// not a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
    pub label: Option<String>,
}

impl From<&Edge> for EdgeKey {
    fn from(edge: &Edge) -> Self {
        Self {
            from: edge.from_node,
            to: edge.to_node,
            label: edge.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDelta {
    pub added: Vec<EdgeKey>,
    pub removed: Vec<EdgeKey>,
}

impl EdgeDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeDeltaTracker {
    known: IndexSet<EdgeKey>,
}

impl EdgeDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything and record `graph`'s edges as the baseline.
    pub fn reset(&mut self, graph: &CanvasGraph) {
        self.known = keys(graph);
    }

    /// Edges added and removed since the last `reset` or `observe`.
    pub fn observe(&mut self, graph: &CanvasGraph) -> EdgeDelta {
        let current = keys(graph);
        let delta = EdgeDelta {
            added: current.difference(&self.known).cloned().collect(),
            removed: self.known.difference(&current).cloned().collect(),
        };
        self.known = current;
        delta
    }
}

fn keys(graph: &CanvasGraph) -> IndexSet<EdgeKey> {
    graph.edges.iter().map(EdgeKey::from).collect()
}

/// Paths of documents whose derived properties may change because of
/// `delta`: file endpoints, and file members of group endpoints.
///
/// Endpoints no longer on the canvas are skipped.
pub fn affected_documents(delta: &EdgeDelta, graph: &CanvasGraph) -> Vec<String> {
    let mut paths: IndexSet<String> = IndexSet::new();

    let endpoints = delta
        .added
        .iter()
        .chain(&delta.removed)
        .flat_map(|key| [key.from, key.to]);

    for id in endpoints {
        match graph.other_side(id) {
            Some(NodeRef::File(file)) => {
                paths.insert(file.path.clone());
            }
            Some(NodeRef::Group(group)) => {
                for member in &group.contained {
                    if let Some(file) = graph.file(member.id) {
                        paths.insert(file.path.clone());
                    }
                }
            }
            _ => {}
        }
    }

    paths.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_canvas;
    use crate::normalize::build_graph;
    use pretty_assertions::assert_eq;

    fn graph(edges: &str) -> CanvasGraph {
        let json = format!(
            r#"{{
            "nodes": [
                {{"id":"g","type":"group","label":"Inbox","x":0,"y":0,"width":1000,"height":500}},
                {{"id":"m","type":"file","file":"member.md","x":10,"y":10,"width":100,"height":100}},
                {{"id":"a","type":"file","file":"a.md","x":-900,"y":0,"width":100,"height":100}},
                {{"id":"c","type":"text","text":"card","x":-900,"y":900,"width":100,"height":100}}
            ],
            "edges": [{edges}]
        }}"#
        );
        build_graph(&parse_canvas(&json).unwrap()).unwrap()
    }

    #[test]
    fn first_observe_after_reset_is_empty() {
        let g = graph(r#"{"id":"e","fromNode":"a","toNode":"c"}"#);
        let mut tracker = EdgeDeltaTracker::new();
        tracker.reset(&g);
        assert!(tracker.observe(&g).is_empty());
    }

    #[test]
    fn added_and_removed_edges_are_reported() {
        let mut tracker = EdgeDeltaTracker::new();
        tracker.reset(&graph(r#"{"id":"e1","fromNode":"a","toNode":"c"}"#));

        let delta = tracker.observe(&graph(r#"{"id":"e2","fromNode":"c","toNode":"a","label":"x"}"#));
        assert_eq!(delta.added.len(), 1);
        assert_eq!(delta.removed.len(), 1);
        assert_eq!(delta.added[0].label.as_deref(), Some("x"));
        assert_eq!(delta.removed[0].to.as_str(), "c");
    }

    #[test]
    fn redrawn_edge_is_not_a_change() {
        let mut tracker = EdgeDeltaTracker::new();
        tracker.reset(&graph(r#"{"id":"old","fromNode":"a","toNode":"c"}"#));
        let delta = tracker.observe(&graph(r#"{"id":"new","fromNode":"a","toNode":"c"}"#));
        assert!(delta.is_empty());
    }

    #[test]
    fn group_endpoints_affect_their_file_members() {
        let mut tracker = EdgeDeltaTracker::new();
        tracker.reset(&graph(""));
        let after = graph(r#"{"id":"e","fromNode":"c","toNode":"g"}"#);
        let delta = tracker.observe(&after);

        // The phantom edge c → m is part of the delta too; m is reported once.
        assert_eq!(affected_documents(&delta, &after), vec!["member.md".to_string()]);
    }

    #[test]
    fn file_endpoints_are_affected() {
        let mut tracker = EdgeDeltaTracker::new();
        let before = graph(r#"{"id":"e","fromNode":"a","toNode":"c"}"#);
        tracker.reset(&before);
        let after = graph("");
        let delta = tracker.observe(&after);
        assert_eq!(affected_documents(&delta, &after), vec!["a.md".to_string()]);
    }
}
