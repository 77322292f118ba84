//! Integration tests: sync runs against a vault on disk.

use cp_core::sync::{self, DocumentStore, Notice};
use cp_core::{Settings, WriteMode};
use cp_vault::{SETTINGS_FILE, Vault, load_settings};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const CANVAS: &str = r#"{
  "nodes": [
    {"id": "inbox", "type": "group", "label": "Inbox", "x": 0, "y": 0, "width": 1000, "height": 500},
    {"id": "doc", "type": "file", "file": "notes/doc.md", "x": 50, "y": 50, "width": 400, "height": 400},
    {"id": "ref", "type": "link", "url": "https://example.com/paper", "x": 2000, "y": 50, "width": 400, "height": 400},
    {"id": "other", "type": "file", "file": "Other Note.md", "x": 2000, "y": 800, "width": 400, "height": 400}
  ],
  "edges": [
    {"id": "e1", "fromNode": "doc", "toNode": "ref", "label": "source"},
    {"id": "e2", "fromNode": "doc", "toNode": "other"}
  ]
}"#;

fn setup(files: &[(&str, &str)]) -> (TempDir, Vault) {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let target = dir.path().join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, contents).unwrap();
    }
    let vault = Vault::open(dir.path()).unwrap();
    (dir, vault)
}

#[test]
fn push_writes_front_matter() {
    let (_dir, mut vault) = setup(&[
        ("notes/doc.md", "---\ntitle: Doc\n---\n# Doc\n"),
        ("Other Note.md", "Other\n"),
        ("board.canvas", CANVAS),
    ]);
    let json = vault.read("board.canvas").unwrap();

    let report = sync::push(&json, &mut vault, &Settings::default(), WriteMode::Overwrite)
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(report.modified, vec!["notes/doc.md".to_string()]);

    let props = vault.properties("notes/doc.md").unwrap();
    assert_eq!(props["groups"], vec!["Inbox".to_string()]);
    assert_eq!(props["source"], vec!["https://example.com/paper".to_string()]);
    assert_eq!(props["files"], vec!["[[Other Note]]".to_string()]);

    let text = vault.read("notes/doc.md").unwrap();
    assert!(text.contains("title: Doc"));
    assert!(text.ends_with("---\n# Doc\n"));
}

#[test]
fn pull_after_synthesize_connects_grouped_values_once() {
    let (_dir, mut vault) = setup(&[
        (
            "notes/doc.md",
            "---\ntopic:\n  - rust\nrelated:\n  - \"[[Other Note]]\"\n  - idea\n---\n",
        ),
        ("Other Note.md", ""),
    ]);
    let settings = Settings::default();

    let report = sync::synthesize("notes/doc.md", &vault, &settings)
        .done()
        .unwrap();
    assert_eq!(report.path, "doc.canvas");
    let json = report.canvas.to_json_pretty().unwrap();
    vault.write(&report.path, &json).unwrap();

    // Single values already have their edge; grouped values only have the
    // edge to their group, so each gets a direct one.
    let pulled = sync::pull(&json, "notes/doc.md", &vault, &settings, false)
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(pulled.nodes_added, 0);
    assert_eq!(pulled.edges_added, 2);

    let json = pulled.canvas.to_json_pretty().unwrap();
    let again = sync::pull(&json, "notes/doc.md", &vault, &settings, false).unwrap();
    assert_eq!(again.notice(), Some(&Notice::NoChanges));
}

#[test]
fn same_folder_location_and_settings_file() {
    let (dir, vault) = setup(&[("notes/doc.md", "---\ntopic: [a, b]\n---\n")]);
    fs::write(
        dir.path().join(SETTINGS_FILE),
        r#"{"newFileLocation": "sameFolder", "excludeKeys": "ignored"}"#,
    )
    .unwrap();
    let settings = load_settings(&dir.path().join(SETTINGS_FILE)).unwrap();

    let report = sync::synthesize("notes/doc.md", &vault, &settings)
        .done()
        .unwrap();
    assert_eq!(report.path, "notes/doc.canvas");
    assert_eq!(report.canvas.edges.len(), 1);
}

#[test]
fn push_skips_documents_outside_the_vault() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("vault");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("doc.md"), "").unwrap();
    fs::write(outer.path().join("outside.md"), "secret body\n").unwrap();
    let mut vault = Vault::open(&root).unwrap();

    let canvas = r#"{
      "nodes": [
        {"id": "doc", "type": "file", "file": "doc.md", "x": 0, "y": 0, "width": 400, "height": 400},
        {"id": "out", "type": "file", "file": "../outside.md", "x": 0, "y": 800, "width": 400, "height": 400},
        {"id": "card", "type": "text", "text": "hello", "x": 1000, "y": 0, "width": 400, "height": 400}
      ],
      "edges": [
        {"id": "e1", "fromNode": "doc", "toNode": "card"},
        {"id": "e2", "fromNode": "out", "toNode": "card"}
      ]
    }"#;

    let report = sync::push(canvas, &mut vault, &Settings::default(), WriteMode::Overwrite)
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(report.modified, vec!["doc.md".to_string()]);
    assert_eq!(report.missing, vec!["../outside.md".to_string()]);
    assert_eq!(
        fs::read_to_string(outer.path().join("outside.md")).unwrap(),
        "secret body\n"
    );
}
