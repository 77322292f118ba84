//! Integration tests: canvas JSON → graph → derived properties → documents.
//!
//! Exercises the full `cp-core` pipeline against fixture canvases and an
//! in-memory document store.

use cp_core::derive::derive_properties;
use cp_core::links::{LinkResolver, PathIndex};
use cp_core::merge::apply_update;
use cp_core::sync::{self, DocumentStore, Notice};
use cp_core::{
    CanvasGraph, DerivedResult, NodeId, PropertyMap, Settings, StoreError, WriteMode, build_graph,
    parse_canvas,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn graph(json: &str) -> CanvasGraph {
    build_graph(&parse_canvas(json).unwrap()).unwrap()
}

fn derive(graph: &CanvasGraph, path: &str) -> DerivedResult {
    let links = PathIndex::new(graph.files.iter().map(|f| f.path.clone()));
    let file = graph.files.iter().find(|f| f.path == path).unwrap();
    derive_properties(file, graph, &Settings::default(), &links).unwrap()
}

fn map(entries: &[(&str, &[&str])]) -> PropertyMap {
    entries
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

fn bidirectional(json: &str) -> String {
    json.replace(r#""toNode": "inbox","#, r#""toNode": "inbox", "toEnd": "none","#)
}

struct MemoryStore {
    links: PathIndex,
    docs: IndexMap<String, PropertyMap>,
}

impl MemoryStore {
    fn new(docs: &[(&str, PropertyMap)]) -> Self {
        Self {
            links: PathIndex::new(docs.iter().map(|(p, _)| *p)),
            docs: docs.iter().map(|(p, m)| (p.to_string(), m.clone())).collect(),
        }
    }
}

impl LinkResolver for MemoryStore {
    fn link_text(&self, target: &str, source: &str) -> String {
        self.links.link_text(target, source)
    }

    fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        self.links.resolve_link(link, source)
    }
}

impl DocumentStore for MemoryStore {
    fn properties(&self, path: &str) -> Option<PropertyMap> {
        self.docs.get(path).cloned()
    }

    fn update_properties(
        &mut self,
        path: &str,
        updates: &PropertyMap,
        mode: WriteMode,
    ) -> Result<bool, StoreError> {
        let doc = self
            .docs
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(apply_update(doc, updates, mode))
    }

    fn folder_exists(&self, _folder: &str) -> bool {
        true
    }
}

// ─── Derivation scenarios ───────────────────────────────────────────────

#[test]
fn unlabeled_card_edge_uses_card_default() {
    let g = graph(include_str!("fixtures/connections.canvas"));
    assert_eq!(derive(&g, "a.md"), Some(map(&[("cards", &["hello"])])));
}

#[test]
fn labeled_card_edge_uses_label() {
    let g = graph(include_str!("fixtures/connections.canvas"));
    assert_eq!(derive(&g, "notes/b.md"), Some(map(&[("topic", &["hello"])])));
}

#[test]
fn unconnected_file_yields_none() {
    let g = graph(include_str!("fixtures/connections.canvas"));
    assert_eq!(derive(&g, "lonely.md"), None);
}

#[test]
fn group_membership_alone() {
    let g = graph(include_str!("fixtures/inbox.canvas"));
    assert_eq!(derive(&g, "doc.md"), Some(map(&[("groups", &["Inbox"])])));
}

#[test]
fn edge_into_group_expands_to_members() {
    let g = graph(include_str!("fixtures/inbox.canvas"));

    let phantoms: Vec<_> = g
        .edges
        .iter()
        .filter(|e| e.id == NodeId::intern("to-inbox").phantom())
        .collect();
    assert_eq!(phantoms.len(), 2);

    assert_eq!(
        derive(&g, "second.md"),
        Some(map(&[("Inbox", &["[[doc]]", "[[member]]"])]))
    );
    assert_eq!(derive(&g, "member.md"), Some(map(&[("groups", &["Inbox"])])));
}

#[test]
fn bidirectional_group_edge_reaches_members() {
    let g = graph(&bidirectional(include_str!("fixtures/inbox.canvas")));
    // The phantom carries the group's label; the unlabeled group edge itself
    // falls back to the default key for a file on the other side.
    for member in ["doc.md", "member.md"] {
        assert_eq!(
            derive(&g, member),
            Some(map(&[
                ("groups", &["Inbox"]),
                ("files", &["[[second]]"]),
                ("Inbox", &["[[second]]"]),
            ]))
        );
    }
}

// ─── Graph properties ───────────────────────────────────────────────────

#[test]
fn containment_is_deterministic() {
    let json = include_str!("fixtures/inbox.canvas");
    let first = graph(json);
    let second = graph(json);
    assert_eq!(first.groups, second.groups);
    assert_eq!(first.files, second.files);
}

#[test]
fn bidirectional_edges_are_symmetric() {
    let json = r#"{
        "nodes": [
            {"id":"a","type":"file","file":"a.md","x":0,"y":0,"width":100,"height":100},
            {"id":"b","type":"file","file":"b.md","x":500,"y":0,"width":100,"height":100}
        ],
        "edges": [{"id":"e","fromNode":"a","toNode":"b","fromEnd":"arrow","label":"peer"}]
    }"#;
    let g = graph(json);
    assert_eq!(derive(&g, "a.md"), Some(map(&[("peer", &["[[b]]"])])));
    assert_eq!(derive(&g, "b.md"), Some(map(&[("peer", &["[[a]]"])])));
}

#[test]
fn unknown_fields_survive_a_round_trip() {
    let canvas = parse_canvas(include_str!("fixtures/connections.canvas")).unwrap();
    let json = canvas.to_json_pretty().unwrap();
    assert!(json.contains(r#""color": "4""#));
    assert_eq!(parse_canvas(&json).unwrap(), canvas);
}

// ─── Sync runs ──────────────────────────────────────────────────────────

#[test]
fn push_merges_duplicate_nodes_and_appends() {
    let json = bidirectional(include_str!("fixtures/inbox.canvas"));
    let mut store = MemoryStore::new(&[
        ("doc.md", map(&[("Inbox", &["[[old]]"])])),
        ("member.md", PropertyMap::new()),
        ("second.md", PropertyMap::new()),
    ]);

    let report = sync::push(&json, &mut store, &Settings::default(), WriteMode::Append)
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(report.modified.len(), 3);
    assert_eq!(
        store.docs["doc.md"],
        map(&[
            ("Inbox", &["[[old]]", "[[second]]"]),
            ("groups", &["Inbox"]),
            ("files", &["[[second]]"]),
        ])
    );
}

#[test]
fn pull_creates_edge_once() {
    let json = include_str!("fixtures/pull.canvas");
    let store = MemoryStore::new(&[
        ("doc.md", map(&[("topics", &["[[Other Note]]"])])),
        ("Other Note.md", PropertyMap::new()),
    ]);
    let settings = Settings::default();

    let first = sync::pull(json, "doc.md", &store, &settings, false)
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(first.nodes_added, 0);
    assert_eq!(first.edges_added, 1);
    let edge = &first.canvas.edges[0];
    assert_eq!(edge.from_node, NodeId::intern("doc"));
    assert_eq!(edge.to_node, NodeId::intern("other"));
    assert_eq!(edge.label.as_deref(), Some("topics"));

    let updated = first.canvas.to_json_pretty().unwrap();
    let second = sync::pull(&updated, "doc.md", &store, &settings, false).unwrap();
    assert_eq!(second.notice(), Some(&Notice::NoChanges));
}

#[test]
fn synthesized_canvas_pushes_back_to_the_same_properties() {
    let properties = map(&[("topic", &["rust"]), ("related", &["[[Other Note]]", "idea"])]);
    let mut store = MemoryStore::new(&[
        ("doc.md", properties.clone()),
        ("Other Note.md", PropertyMap::new()),
    ]);
    let settings = Settings::default();

    let report = sync::synthesize("doc.md", &store, &settings).done().unwrap();
    assert_eq!(report.path, "doc.canvas");
    assert!(report.broken_links.is_empty());

    let json = report.canvas.to_json_pretty().unwrap();
    store.docs.insert("doc.md".into(), PropertyMap::new());
    sync::push(&json, &mut store, &settings, WriteMode::Overwrite).unwrap();

    let written = &store.docs["doc.md"];
    assert_eq!(written["topic"], vec!["rust".to_string()]);
    // Group members are listed cards first, then files.
    assert_eq!(
        written["related"],
        vec!["idea".to_string(), "[[Other Note]]".to_string()]
    );
}
