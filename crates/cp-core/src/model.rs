//! Canvas data model.
//!
//! Two layers live here. The *raw* layer (`RawCanvas`, `RawNode`, `RawEdge`)
//! mirrors the JSON canvas file one-to-one and keeps every field it does not
//! understand, so a canvas can be read, extended, and written back without
//! losing authored data. The *typed* layer (`CardNode`, `FileNode`,
//! `UrlNode`, `GroupNode`, `Edge`, `CanvasGraph`) is what the pipeline
//! stages produce and the property deriver consumes.

use crate::id::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Ordered property key → ordered list of values.
pub type PropertyMap = IndexMap<String, Vec<String>>;

/// `None` means the file node has no canvas-implied properties at all.
pub type DerivedResult = Option<PropertyMap>;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if `inner` lies entirely within `self`. Shared edges count as inside.
    pub fn encloses(&self, inner: &Bounds) -> bool {
        self.x <= inner.x
            && self.y <= inner.y
            && self.x + self.width >= inner.x + inner.width
            && self.y + self.height >= inner.y + inner.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ─── Edge attachment ─────────────────────────────────────────────────────

/// Which side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Edge end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndKind {
    None,
    Arrow,
}

// ─── Raw canvas (file format) ────────────────────────────────────────────

/// Node `type` discriminators understood by the ingest stage.
pub mod node_type {
    pub const TEXT: &str = "text";
    pub const FILE: &str = "file";
    pub const LINK: &str = "link";
    pub const GROUP: &str = "group";
}

/// A canvas file: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCanvas {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawCanvas {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Serialize with two-space indentation, the way canvas files are stored.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One node as stored in the canvas file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawNode {
    fn bare(id: NodeId, kind: &str, bounds: Bounds) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            text: None,
            file: None,
            subpath: None,
            url: None,
            label: None,
            extra: Map::new(),
        }
    }

    pub fn text(id: NodeId, text: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::bare(id, node_type::TEXT, bounds)
        }
    }

    pub fn file(id: NodeId, path: impl Into<String>, subpath: Option<String>, bounds: Bounds) -> Self {
        Self {
            file: Some(path.into()),
            subpath,
            ..Self::bare(id, node_type::FILE, bounds)
        }
    }

    pub fn link(id: NodeId, url: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(id, node_type::LINK, bounds)
        }
    }

    pub fn group(id: NodeId, label: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::bare(id, node_type::GROUP, bounds)
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// One edge as stored in the canvas file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub id: NodeId,
    pub from_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_end: Option<EndKind>,
    pub to_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_end: Option<EndKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEdge {
    pub fn new(id: NodeId, from: (NodeId, Side), to: (NodeId, Side), label: Option<String>) -> Self {
        Self {
            id,
            from_node: from.0,
            from_side: Some(from.1),
            from_end: None,
            to_node: to.0,
            to_side: Some(to.1),
            to_end: None,
            label,
            extra: Map::new(),
        }
    }
}

// ─── Typed nodes ─────────────────────────────────────────────────────────

/// The four node kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Card,
    File,
    Url,
    Group,
}

/// Free-floating text node.
#[derive(Debug, Clone, PartialEq)]
pub struct CardNode {
    pub id: NodeId,
    pub text: String,
    pub bounds: Bounds,
}

/// A node that embeds a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub id: NodeId,
    /// Vault-relative document path.
    pub path: String,
    /// Stored sub-section reference, e.g. `#Heading`.
    pub subpath: Option<String>,
    pub bounds: Bounds,
    /// Groups that geometrically contain this node. Filled by containment.
    pub in_groups: SmallVec<[NodeId; 2]>,
}

/// A web link node.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlNode {
    pub id: NodeId,
    pub url: String,
    pub bounds: Bounds,
}

/// A non-group node inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// A labeled geometric container.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: NodeId,
    pub label: String,
    pub bounds: Bounds,
    /// Cards, files and urls inside the group. Never other groups.
    pub contained: Vec<Member>,
}

// ─── Typed edges ─────────────────────────────────────────────────────────

/// A normalized connection. Phantom edges share this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: NodeId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub from_side: Option<Side>,
    pub to_side: Option<Side>,
    pub label: Option<String>,
    pub is_bidirectional: bool,
}

/// A resolved reference to any typed node in a graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Card(&'a CardNode),
    File(&'a FileNode),
    Url(&'a UrlNode),
    Group(&'a GroupNode),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Card(_) => NodeKind::Card,
            NodeRef::File(_) => NodeKind::File,
            NodeRef::Url(_) => NodeKind::Url,
            NodeRef::Group(_) => NodeKind::Group,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            NodeRef::Card(n) => n.bounds,
            NodeRef::File(n) => n.bounds,
            NodeRef::Url(n) => n.bounds,
            NodeRef::Group(n) => n.bounds,
        }
    }
}

// ─── Canvas graph ────────────────────────────────────────────────────────

/// The fully normalized canvas: typed nodes, resolved containment, and
/// edges with bidirectionality computed and group targets expanded.
///
/// Produced once per canvas read by [`crate::normalize::normalize_edges`]
/// and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasGraph {
    pub cards: Vec<CardNode>,
    pub files: Vec<FileNode>,
    pub urls: Vec<UrlNode>,
    pub groups: Vec<GroupNode>,
    pub edges: Vec<Edge>,
}

impl CanvasGraph {
    pub fn card(&self, id: NodeId) -> Option<&CardNode> {
        self.cards.iter().find(|n| n.id == id)
    }

    pub fn file(&self, id: NodeId) -> Option<&FileNode> {
        self.files.iter().find(|n| n.id == id)
    }

    pub fn url(&self, id: NodeId) -> Option<&UrlNode> {
        self.urls.iter().find(|n| n.id == id)
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        self.groups.iter().find(|n| n.id == id)
    }

    /// Type of a node by id, checking cards, files, urls, then groups.
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        kind_of(&self.cards, &self.files, &self.urls, &self.groups, id)
    }

    /// Resolve the far endpoint of an edge, checking cards, urls, files,
    /// then groups. The first match in each collection wins.
    pub fn other_side(&self, id: NodeId) -> Option<NodeRef<'_>> {
        if let Some(card) = self.card(id) {
            return Some(NodeRef::Card(card));
        }
        if let Some(url) = self.url(id) {
            return Some(NodeRef::Url(url));
        }
        if let Some(file) = self.file(id) {
            return Some(NodeRef::File(file));
        }
        self.group(id).map(NodeRef::Group)
    }

    /// File nodes embedding the given document path, in canvas order.
    pub fn files_for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FileNode> + 'a {
        self.files.iter().filter(move |f| f.path == path)
    }
}

/// Shared by the normalizer (before a `CanvasGraph` exists) and the graph.
pub(crate) fn kind_of(
    cards: &[CardNode],
    files: &[FileNode],
    urls: &[UrlNode],
    groups: &[GroupNode],
    id: NodeId,
) -> Option<NodeKind> {
    if cards.iter().any(|n| n.id == id) {
        Some(NodeKind::Card)
    } else if files.iter().any(|n| n.id == id) {
        Some(NodeKind::File)
    } else if urls.iter().any(|n| n.id == id) {
        Some(NodeKind::Url)
    } else if groups.iter().any(|n| n.id == id) {
        Some(NodeKind::Group)
    } else {
        None
    }
}
