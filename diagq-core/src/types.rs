//! Core data model for target resolution and diagnostic builds.
//!
//! Everything here is created fresh for one invocation and discarded at the
//! end of it. Target nodes are owned by the graph engine; this crate only
//! holds their identity and structural kind for the duration of a run.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Fully-qualified label addressing one node in the build graph,
/// e.g. `//src/auth:auth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TargetLabel(String);

impl TargetLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for TargetLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Structural kind of a target node as reported by the graph engine.
///
/// Only the binary/library/test variants of the Rust rule family take part
/// in diagnostic builds; every other kind string is preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Binary,
    Library,
    Test,
    Other(String),
}

impl TargetKind {
    /// Parse an engine kind string (`rust_binary`, `rust_library`, ...).
    pub fn parse(raw: &str) -> Self {
        match raw {
            "rust_binary" => TargetKind::Binary,
            "rust_library" => TargetKind::Library,
            "rust_test" => TargetKind::Test,
            other => TargetKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TargetKind::Binary => "rust_binary",
            TargetKind::Library => "rust_library",
            TargetKind::Test => "rust_test",
            TargetKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node returned by an ownership query: identity plus structural kind.
///
/// Immutable once returned by the graph service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNode {
    pub label: TargetLabel,
    pub kind: TargetKind,
}

impl TargetNode {
    pub fn new(label: impl Into<TargetLabel>, kind: TargetKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn binary(label: impl Into<TargetLabel>) -> Self {
        Self::new(label, TargetKind::Binary)
    }

    pub fn library(label: impl Into<TargetLabel>) -> Self {
        Self::new(label, TargetKind::Library)
    }

    pub fn test(label: impl Into<TargetLabel>) -> Self {
        Self::new(label, TargetKind::Test)
    }
}

/// Ordered, deduplicated label set bounding a scoped ownership query.
///
/// Built once per invocation from the unrestricted owner lookup, then reused
/// to scope the second, configuration-aware lookup. Scoped results must be a
/// subset of the universe; the pipeline enforces this rather than trusting
/// the graph implementation.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    order: Vec<TargetLabel>,
    members: HashSet<TargetLabel>,
}

impl Universe {
    pub fn from_nodes<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a TargetNode>,
    {
        let mut universe = Universe::default();
        for node in nodes {
            if universe.members.insert(node.label.clone()) {
                universe.order.push(node.label.clone());
            }
        }
        universe
    }

    pub fn contains(&self, label: &TargetLabel) -> bool {
        self.members.contains(label)
    }

    /// Member labels in first-seen order.
    pub fn labels(&self) -> &[TargetLabel] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Which diagnostic sub-target gets built for every node of a run.
///
/// The choice is global per invocation; the two flavors are never mixed
/// within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticMode {
    /// The compiler's own diagnostic dump.
    #[default]
    Compiler,
    /// Structured findings from the external linter.
    Lint,
}

impl DiagnosticMode {
    /// Engine-facing sub-target name appended to a node's label.
    pub fn sub_target(&self) -> &'static str {
        match self {
            DiagnosticMode::Compiler => "diag.json",
            DiagnosticMode::Lint => "lint.json",
        }
    }
}

/// A node identity paired with the run's diagnostic mode.
///
/// Derived deterministically from a [`TargetNode`]; never constructed from
/// anything else, so the ref-to-node mapping stays injective per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubTargetRef {
    pub label: TargetLabel,
    pub mode: DiagnosticMode,
}

impl SubTargetRef {
    pub fn for_node(node: &TargetNode, mode: DiagnosticMode) -> Self {
        Self {
            label: node.label.clone(),
            mode,
        }
    }
}

impl fmt::Display for SubTargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.label, self.mode.sub_target())
    }
}

/// Identity of one deduplicatable unit of work inside a batch.
///
/// The scheduler's memo table is keyed by the rendered form of this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkUnit {
    /// An ordinary build of a node, pulled in as a dependency.
    Primary(TargetLabel),
    /// The diagnostic action for one submitted ref.
    Diagnostic(SubTargetRef),
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Primary(label) => write!(f, "{label}"),
            WorkUnit::Diagnostic(reference) => write!(f, "{reference}"),
        }
    }
}

/// An absolute filesystem location produced by a build. No further structure
/// is imposed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_round_trip() {
        assert_eq!(TargetKind::parse("rust_binary"), TargetKind::Binary);
        assert_eq!(TargetKind::parse("rust_library"), TargetKind::Library);
        assert_eq!(TargetKind::parse("rust_test"), TargetKind::Test);
        assert_eq!(
            TargetKind::parse("cxx_library"),
            TargetKind::Other("cxx_library".to_string())
        );
        assert_eq!(TargetKind::parse("rust_library").as_str(), "rust_library");
    }

    #[test]
    fn test_sub_target_ref_rendering() {
        let node = TargetNode::library("//src/auth:auth");
        let compiler = SubTargetRef::for_node(&node, DiagnosticMode::Compiler);
        let lint = SubTargetRef::for_node(&node, DiagnosticMode::Lint);

        assert_eq!(compiler.to_string(), "//src/auth:auth[diag.json]");
        assert_eq!(lint.to_string(), "//src/auth:auth[lint.json]");
    }

    #[test]
    fn test_universe_preserves_first_seen_order() {
        let nodes = vec![
            TargetNode::library("//b:b"),
            TargetNode::library("//a:a"),
            TargetNode::test("//b:b"),
        ];
        let universe = Universe::from_nodes(&nodes);

        assert_eq!(universe.len(), 2);
        assert_eq!(
            universe.labels(),
            &[TargetLabel::from("//b:b"), TargetLabel::from("//a:a")]
        );
        assert!(universe.contains(&TargetLabel::from("//a:a")));
        assert!(!universe.contains(&TargetLabel::from("//c:c")));
    }

    #[test]
    fn test_work_unit_keys_distinguish_primary_from_diagnostic() {
        let node = TargetNode::binary("//x:x");
        let primary = WorkUnit::Primary(node.label.clone());
        let diagnostic =
            WorkUnit::Diagnostic(SubTargetRef::for_node(&node, DiagnosticMode::Compiler));

        assert_ne!(primary.to_string(), diagnostic.to_string());
        assert_eq!(primary.to_string(), "//x:x");
        assert_eq!(diagnostic.to_string(), "//x:x[diag.json]");
    }
}
