use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Axis, Error, Result};
use crate::ir::{Metadata, Position, SymbolicPosition};

static COLUMN_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<prefix>.*?)(?P<column>\d+)$").expect("valid column regex"));

/// Looks the symbolic keys up in the metadata coordinate dictionaries.
/// `node` only labels the error.
pub fn resolve_position(pos: &SymbolicPosition, metadata: &Metadata, node: &str) -> Result<Position> {
    let x = metadata
        .xpos
        .get(&pos.x)
        .copied()
        .ok_or_else(|| Error::UnresolvedPosition {
            axis: Axis::X,
            key: pos.x.clone(),
            node: node.to_string(),
        })?;
    let y = metadata
        .ypos
        .get(&pos.y)
        .copied()
        .ok_or_else(|| Error::UnresolvedPosition {
            axis: Axis::Y,
            key: pos.y.clone(),
            node: node.to_string(),
        })?;
    Ok(Position { x, y })
}

/// Same row, one column to the right: `l2` becomes `l3`.
pub fn next_column(pos: &SymbolicPosition) -> Result<SymbolicPosition> {
    let caps = COLUMN_KEY_RE
        .captures(&pos.x)
        .ok_or_else(|| Error::InvalidColumnKey { key: pos.x.clone() })?;
    let next = caps["column"]
        .parse::<u64>()
        .ok()
        .and_then(|column| column.checked_add(1))
        .ok_or_else(|| Error::InvalidColumnKey { key: pos.x.clone() })?;
    Ok(SymbolicPosition {
        x: format!("{}{next}", &caps["prefix"]),
        y: pos.y.clone(),
    })
}
