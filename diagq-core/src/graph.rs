//! Graph service seam: ownership queries and dependency closures.
//!
//! The dependency graph itself lives in an external engine. This module
//! defines the read-only view the pipeline consumes, plus an in-memory
//! implementation used as the deterministic fixture in tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::types::{TargetLabel, TargetNode, Universe};

/// Read-only view of the dependency build graph.
///
/// Implementations must return owners in a stable order: the pipeline's
/// output ordering is defined in terms of it, so ordering is part of this
/// contract, not an accident of the backing store.
#[async_trait]
pub trait TargetGraph: Send + Sync {
    /// All nodes that declare `file` as an input.
    ///
    /// Unknown or unowned files yield an empty result, not an error.
    async fn owners(&self, file: &str) -> Result<Vec<TargetNode>>;

    /// Ownership lookup restricted to `universe`.
    async fn owners_in(&self, file: &str, universe: &Universe) -> Result<Vec<TargetNode>>;

    /// Transitive dependency closure of `label`, excluding `label` itself.
    async fn deps(&self, label: &TargetLabel) -> Result<Vec<TargetLabel>>;
}

/// In-memory target graph with insertion-order ownership results.
///
/// `owners` returns nodes in registration order, which is what makes
/// pipeline output deterministic in tests. `deps` stores direct edges and
/// answers with the BFS transitive closure.
#[derive(Debug, Clone, Default)]
pub struct StaticGraph {
    owners: HashMap<String, Vec<TargetNode>>,
    deps: HashMap<TargetLabel, Vec<TargetLabel>>,
}

impl StaticGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` as an owner of `file`. Owners are returned in the
    /// order they were added.
    pub fn add_owner(&mut self, file: impl Into<String>, node: TargetNode) -> &mut Self {
        self.owners.entry(file.into()).or_default().push(node);
        self
    }

    /// Register a direct dependency edge `label -> dep`.
    pub fn add_dep(
        &mut self,
        label: impl Into<TargetLabel>,
        dep: impl Into<TargetLabel>,
    ) -> &mut Self {
        self.deps.entry(label.into()).or_default().push(dep.into());
        self
    }
}

#[async_trait]
impl TargetGraph for StaticGraph {
    async fn owners(&self, file: &str) -> Result<Vec<TargetNode>> {
        Ok(self.owners.get(file).cloned().unwrap_or_default())
    }

    async fn owners_in(&self, file: &str, universe: &Universe) -> Result<Vec<TargetNode>> {
        let all = self.owners(file).await?;
        Ok(all
            .into_iter()
            .filter(|node| universe.contains(&node.label))
            .collect())
    }

    async fn deps(&self, label: &TargetLabel) -> Result<Vec<TargetLabel>> {
        let mut seen: HashSet<TargetLabel> = HashSet::new();
        let mut closure = Vec::new();
        let mut queue = VecDeque::from([label.clone()]);
        seen.insert(label.clone());

        while let Some(current) = queue.pop_front() {
            if let Some(direct) = self.deps.get(&current) {
                for dep in direct {
                    if seen.insert(dep.clone()) {
                        closure.push(dep.clone());
                        queue.push_back(dep.clone());
                    }
                }
            }
        }

        Ok(closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> StaticGraph {
        let mut graph = StaticGraph::new();
        graph
            .add_owner("src/lib.rs", TargetNode::library("//src:lib"))
            .add_owner("src/lib.rs", TargetNode::test("//src:lib-test"))
            .add_dep("//src:lib", "//dep:a")
            .add_dep("//dep:a", "//dep:b")
            .add_dep("//src:lib-test", "//dep:a");
        graph
    }

    #[tokio::test]
    async fn test_owners_in_registration_order() {
        let graph = sample_graph();
        let owners = graph.owners("src/lib.rs").await.unwrap();

        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0].label, TargetLabel::from("//src:lib"));
        assert_eq!(owners[1].label, TargetLabel::from("//src:lib-test"));
    }

    #[tokio::test]
    async fn test_unknown_file_has_no_owners() {
        let graph = sample_graph();
        let owners = graph.owners("unused.txt").await.unwrap();
        assert!(owners.is_empty());
    }

    #[tokio::test]
    async fn test_owners_in_respects_universe() {
        let graph = sample_graph();
        let bound = [TargetNode::library("//src:lib")];
        let universe = Universe::from_nodes(&bound);

        let scoped = graph.owners_in("src/lib.rs", &universe).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].label, TargetLabel::from("//src:lib"));
    }

    #[tokio::test]
    async fn test_deps_returns_transitive_closure() {
        let graph = sample_graph();
        let closure = graph.deps(&TargetLabel::from("//src:lib")).await.unwrap();

        assert_eq!(
            closure,
            vec![TargetLabel::from("//dep:a"), TargetLabel::from("//dep:b")]
        );
    }

    #[tokio::test]
    async fn test_deps_handles_cycles() {
        let mut graph = StaticGraph::new();
        graph
            .add_dep("//a:a", "//b:b")
            .add_dep("//b:b", "//a:a");

        let closure = graph.deps(&TargetLabel::from("//a:a")).await.unwrap();
        assert_eq!(closure, vec![TargetLabel::from("//b:b")]);
    }
}
