//! Structural-kind filtering for owner sets.

use crate::types::{TargetKind, TargetNode};

/// Whether a kind participates in diagnostic builds.
pub fn is_diagnosable(kind: &TargetKind) -> bool {
    matches!(
        kind,
        TargetKind::Binary | TargetKind::Library | TargetKind::Test
    )
}

/// Keep only nodes whose kind participates in diagnostic builds.
///
/// Order-preserving. Unmatched nodes are dropped silently; this is
/// filtering, not validation.
pub fn filter_diagnosable(nodes: &[TargetNode]) -> Vec<TargetNode> {
    nodes
        .iter()
        .filter(|node| is_diagnosable(&node.kind))
        .cloned()
        .collect()
}
