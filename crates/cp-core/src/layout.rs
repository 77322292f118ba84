//! Layout constants and edge side selection shared by canvas synthesis and
//! incremental pulling.

use crate::model::{Bounds, Side};

/// Size of a document (file) node.
pub const FILE_WIDTH: f64 = 400.0;
pub const FILE_HEIGHT: f64 = 400.0;
/// Size of a link node.
pub const URL_WIDTH: f64 = 400.0;
pub const URL_HEIGHT: f64 = 400.0;
/// Size of a short text card.
pub const CARD_WIDTH: f64 = 250.0;
pub const CARD_HEIGHT: f64 = 60.0;
/// Size of a text card whose text is longer than [`LONG_TEXT`] characters.
pub const LONG_CARD_WIDTH: f64 = 400.0;
pub const LONG_CARD_HEIGHT: f64 = 120.0;
pub const LONG_TEXT: usize = 15;

/// Gap between stacked nodes, and between a group's border and its members.
pub const MARGIN: f64 = 50.0;
/// Horizontal distance from the anchor document to the property column.
pub const COLUMN_OFFSET: f64 = 1000.0;

/// Where the anchor document of a synthesized canvas sits horizontally.
pub const ANCHOR_X: f64 = 0.0;

/// Pick the sides an edge attaches to, given both endpoints' bounds.
///
/// The axis with the larger center displacement wins; ties go horizontal.
/// Returns `(from_side, to_side)`.
pub fn choose_sides(from: &Bounds, to: &Bounds) -> (Side, Side) {
    let (fx, fy) = from.center();
    let (tx, ty) = to.center();
    let dx = tx - fx;
    let dy = ty - fy;

    if dy.abs() > dx.abs() {
        if dy > 0.0 {
            (Side::Bottom, Side::Top)
        } else {
            (Side::Top, Side::Bottom)
        }
    } else if dx >= 0.0 {
        (Side::Right, Side::Left)
    } else {
        (Side::Left, Side::Right)
    }
}

/// Size of a text card holding `text`.
pub fn card_size(text: &str) -> (f64, f64) {
    if text.chars().count() > LONG_TEXT {
        (LONG_CARD_WIDTH, LONG_CARD_HEIGHT)
    } else {
        (CARD_WIDTH, CARD_HEIGHT)
    }
}
