//! The single-shot query-build-collect pipeline.
//!
//! Orchestration is sequential and cheap: resolve owners, scope a second
//! lookup to that universe, narrow by kind, derive sub-targets. The one
//! suspension point that actually takes time is the batched build, which the
//! scheduler runs concurrently.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate;
use crate::error::Result;
use crate::graph::TargetGraph;
use crate::kind;
use crate::scheduler::{BuildBackend, BuildScheduler, FailureMode};
use crate::subtarget;
use crate::types::{ArtifactPath, DiagnosticMode, TargetNode, Universe};

/// One-shot diagnostic pipeline over an external graph and build engine.
pub struct Pipeline {
    graph: Arc<dyn TargetGraph>,
    backend: Arc<dyn BuildBackend>,
    failure_mode: FailureMode,
}

impl Pipeline {
    pub fn new(graph: Arc<dyn TargetGraph>, backend: Arc<dyn BuildBackend>) -> Self {
        Self {
            graph,
            backend,
            failure_mode: FailureMode::default(),
        }
    }

    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Resolve `file` to its owning targets and collect their diagnostic
    /// artifacts.
    ///
    /// Returns an empty list when the file has no owners or no owner of an
    /// accepted kind; neither case schedules a build. Per-target build
    /// problems degrade the result; only engine failures surface as errors.
    pub async fn run(&self, file: &str, mode: DiagnosticMode) -> Result<Vec<ArtifactPath>> {
        let unscoped = self.graph.owners(file).await?;
        if unscoped.is_empty() {
            info!(file, "no owning targets");
            return Ok(Vec::new());
        }
        debug!(file, owners = unscoped.len(), "resolved unscoped owners");

        let universe = Universe::from_nodes(&unscoped);
        let scoped = self.graph.owners_in(file, &universe).await?;

        // Scoped results must stay inside the universe, even against a
        // misbehaving graph implementation.
        let scoped: Vec<TargetNode> = scoped
            .into_iter()
            .filter(|node| {
                if universe.contains(&node.label) {
                    true
                } else {
                    warn!(label = %node.label, "scoped owner outside its universe, dropping");
                    false
                }
            })
            .collect();

        let nodes = kind::filter_diagnosable(&scoped);
        if nodes.is_empty() {
            info!(file, "owners exist but none are of a diagnosable kind");
            return Ok(Vec::new());
        }
        info!(file, targets = nodes.len(), ?mode, "building diagnostics");

        let refs = subtarget::select_sub_targets(&nodes, mode);

        // Fresh scheduler per run: the dedup memo is invocation-scoped.
        let scheduler = BuildScheduler::new(self.graph.clone(), self.backend.clone())
            .with_failure_mode(self.failure_mode);
        let report = scheduler.build_all(&refs).await?;

        Ok(aggregate::collect_artifacts(&refs, &report))
    }
}
