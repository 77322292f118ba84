//! Canvas synthesis: lay out a new canvas from a document's properties.
//!
//! The document itself is the anchor on the left. Each property becomes one
//! labeled edge to a column on the right: a single node for a one-value
//! property, or a group of nodes laid out left to right for a list.

use crate::config::{NewFileLocation, Settings};
use crate::id::NodeId;
use crate::layout::{
    ANCHOR_X, COLUMN_OFFSET, FILE_HEIGHT, FILE_WIDTH, MARGIN, URL_HEIGHT, URL_WIDTH, card_size,
    choose_sides,
};
use crate::links::{LinkResolver, is_url, resolve_wikilink, wikilink_inner};
use crate::model::{Bounds, PropertyMap, RawCanvas, RawEdge, RawNode};

/// A synthesized canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub canvas: RawCanvas,
    /// The anchor node representing the source document.
    pub root: NodeId,
    /// Wikilink values that resolved to no document, kept as written.
    pub broken_links: Vec<String>,
}

/// Build a node for one property value at `(x, y)`.
///
/// Wikilinks become file nodes, `http…` values link nodes, anything else a
/// text card. Returns the node and whether it is a broken file reference.
pub fn value_node(
    value: &str,
    x: f64,
    y: f64,
    source: &str,
    links: &dyn LinkResolver,
) -> (RawNode, bool) {
    let id = NodeId::generate();
    if let Some(inner) = wikilink_inner(value) {
        let resolved = resolve_wikilink(links, inner, source);
        let bounds = Bounds::new(x, y, FILE_WIDTH, FILE_HEIGHT);
        (
            RawNode::file(id, resolved.path, resolved.subpath, bounds),
            resolved.broken,
        )
    } else if is_url(value) {
        (
            RawNode::link(id, value, Bounds::new(x, y, URL_WIDTH, URL_HEIGHT)),
            false,
        )
    } else {
        let (w, h) = card_size(value);
        (RawNode::text(id, value, Bounds::new(x, y, w, h)), false)
    }
}

/// Lay out `properties` of the document at `source` as a new canvas.
///
/// Properties with no values are skipped.
pub fn synthesize_canvas(
    source: &str,
    properties: &PropertyMap,
    links: &dyn LinkResolver,
) -> Synthesis {
    let column_x = ANCHOR_X + COLUMN_OFFSET;
    let mut cursor_y = 0.0;
    let mut nodes = Vec::new();
    let mut targets: Vec<(NodeId, Bounds, &str)> = Vec::new();
    let mut broken_links = Vec::new();

    let mut place = |value: &str, x: f64, y: f64, nodes: &mut Vec<RawNode>| {
        let (node, broken) = value_node(value, x, y, source, links);
        if broken {
            broken_links.push(value.to_string());
        }
        let bounds = node.bounds();
        let id = node.id;
        nodes.push(node);
        (id, bounds)
    };

    for (key, values) in properties {
        match values.as_slice() {
            [] => continue,
            [single] => {
                let (id, bounds) = place(single.as_str(), column_x, cursor_y, &mut nodes);
                targets.push((id, bounds, key.as_str()));
                cursor_y += bounds.height + MARGIN;
            }
            many => {
                let group_id = NodeId::generate();
                let group_index = nodes.len();
                let mut member_x = column_x + MARGIN;
                let member_y = cursor_y + MARGIN;
                let mut tallest: f64 = 0.0;

                // The group goes first so it renders behind its members.
                nodes.push(RawNode::group(group_id, key.clone(), Bounds::default()));
                for value in many {
                    let (_, bounds) = place(value.as_str(), member_x, member_y, &mut nodes);
                    member_x += bounds.width + MARGIN;
                    tallest = tallest.max(bounds.height);
                }

                let group_bounds = Bounds::new(
                    column_x,
                    cursor_y,
                    member_x - column_x,
                    tallest + 2.0 * MARGIN,
                );
                let group = &mut nodes[group_index];
                group.x = group_bounds.x;
                group.y = group_bounds.y;
                group.width = group_bounds.width;
                group.height = group_bounds.height;

                targets.push((group_id, group_bounds, key.as_str()));
                cursor_y += group_bounds.height + MARGIN;
            }
        }
    }

    let total_height = (cursor_y - MARGIN).max(0.0);
    let root = NodeId::generate();
    let root_bounds = Bounds::new(
        ANCHOR_X,
        total_height / 2.0 - FILE_HEIGHT / 2.0,
        FILE_WIDTH,
        FILE_HEIGHT,
    );
    nodes.insert(0, RawNode::file(root, source, None, root_bounds));

    let edges = targets
        .into_iter()
        .map(|(target, bounds, key)| {
            let (from_side, to_side) = choose_sides(&root_bounds, &bounds);
            RawEdge::new(
                NodeId::generate(),
                (root, from_side),
                (target, to_side),
                Some(key.to_string()),
            )
        })
        .collect();

    log::debug!(
        "synthesized canvas for {source}: {} nodes, {} broken links",
        nodes.len(),
        broken_links.len()
    );

    Synthesis {
        canvas: RawCanvas {
            nodes,
            edges,
            ..Default::default()
        },
        root,
        broken_links,
    }
}

/// Where the synthesized canvas for `source` is saved, plus a warning when
/// the configured folder is missing and the vault root is used instead.
pub fn canvas_output_path(
    source: &str,
    settings: &Settings,
    folder_exists: impl Fn(&str) -> bool,
) -> (String, Option<String>) {
    let file_name = source.rsplit('/').next().unwrap_or(source);
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let name = format!("{stem}.canvas");

    let in_folder = |folder: &str| {
        if folder.is_empty() {
            name.clone()
        } else {
            format!("{folder}/{name}")
        }
    };

    match settings.new_file_location {
        NewFileLocation::Root => (name.clone(), None),
        NewFileLocation::SameFolder => {
            let folder = source.rsplit_once('/').map_or("", |(dir, _)| dir);
            (in_folder(folder), None)
        }
        NewFileLocation::Custom => {
            let folder = settings.custom_file_location.trim().trim_matches('/');
            if folder.is_empty() || folder_exists(folder) {
                (in_folder(folder), None)
            } else {
                let warning = format!(
                    "folder \"{folder}\" does not exist; saving {name} in the vault root"
                );
                log::warn!("{warning}");
                (name.clone(), Some(warning))
            }
        }
    }
}
