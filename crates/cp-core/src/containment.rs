//! Group containment: which nodes sit geometrically inside which groups.
//!
//! Every card, file and url node is tested against every group. Groups are
//! never tested against other groups, so a group nested inside another
//! contributes nothing to the outer group's membership.

use crate::id::NodeId;
use crate::ingest::Ingested;
use crate::model::{CardNode, FileNode, GroupNode, Member, NodeKind, RawEdge, UrlNode};

/// Second pipeline stage: group membership resolved in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contained {
    pub cards: Vec<CardNode>,
    pub files: Vec<FileNode>,
    pub urls: Vec<UrlNode>,
    pub groups: Vec<GroupNode>,
    pub edges: Vec<RawEdge>,
}

/// Fill `GroupNode::contained` and `FileNode::in_groups`.
///
/// Membership lists are rebuilt from scratch, so the result depends only on
/// geometry: groups in canvas order, members ordered cards → files → urls.
#[must_use]
pub fn resolve_containment(ingested: Ingested) -> Contained {
    let Ingested {
        cards,
        mut files,
        urls,
        mut groups,
        edges,
    } = ingested;

    for file in &mut files {
        file.in_groups.clear();
    }

    for group in &mut groups {
        group.contained.clear();
        let area = group.bounds;

        for card in &cards {
            if area.encloses(&card.bounds) {
                group.contained.push(member(card.id, NodeKind::Card));
            }
        }
        for file in &mut files {
            if area.encloses(&file.bounds) {
                group.contained.push(member(file.id, NodeKind::File));
                file.in_groups.push(group.id);
            }
        }
        for url in &urls {
            if area.encloses(&url.bounds) {
                group.contained.push(member(url.id, NodeKind::Url));
            }
        }

        log::trace!(
            "group {} ({:?}) contains {} nodes",
            group.id,
            group.label,
            group.contained.len()
        );
    }

    Contained {
        cards,
        files,
        urls,
        groups,
        edges,
    }
}

fn member(id: NodeId, kind: NodeKind) -> Member {
    Member { id, kind }
}
