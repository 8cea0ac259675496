//! Diagnostic sub-target derivation.

use crate::types::{DiagnosticMode, SubTargetRef, TargetNode};

/// Derive one diagnostic sub-target per node, all sharing the run's mode.
///
/// Pure and total: every node of the accepted kinds is assumed to support
/// both modes. If the engine disagrees for a particular node, that surfaces
/// later as a build failure for that single ref.
pub fn select_sub_targets(nodes: &[TargetNode], mode: DiagnosticMode) -> Vec<SubTargetRef> {
    nodes
        .iter()
        .map(|node| SubTargetRef::for_node(node, mode))
        .collect()
}
