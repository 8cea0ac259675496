//! Concurrent batch construction of diagnostic sub-targets.
//!
//! Builds for distinct refs run concurrently. Units of work shared between
//! refs (transitive dependencies, most commonly) are built at most once per
//! batch: an explicit memo table keyed by unit identity hands every
//! concurrent requester the same in-flight build instead of starting a
//! second one.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::error::{EngineError, Result, UnitError};
use crate::graph::TargetGraph;
use crate::types::{ArtifactPath, SubTargetRef, WorkUnit};

/// Executes a single unit of work and reports the artifacts it produced.
///
/// Implementations wrap the external compiler/linter invocation. Zero
/// artifacts is a valid success (the action ran but had nothing to emit).
#[async_trait]
pub trait BuildBackend: Send + Sync {
    async fn build_unit(&self, unit: &WorkUnit) -> std::result::Result<Vec<ArtifactPath>, UnitError>;
}

/// What happened to one submitted ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefOutcome {
    /// The diagnostic action ran; holds every artifact it produced.
    Built(Vec<ArtifactPath>),
    /// The ref or one of its dependencies failed to build.
    Failed(String),
}

/// Per-ref outcomes for one batch. Unordered; callers impose ordering by
/// iterating their own submission list.
#[derive(Debug, Default)]
pub struct BuildReport {
    outcomes: HashMap<SubTargetRef, RefOutcome>,
}

impl BuildReport {
    pub fn outcome(&self, reference: &SubTargetRef) -> Option<&RefOutcome> {
        self.outcomes.get(reference)
    }

    fn record(&mut self, reference: SubTargetRef, outcome: RefOutcome) {
        self.outcomes.insert(reference, outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Whether one failing ref aborts the whole batch.
///
/// The engine's own semantics differ between deployments, so this is
/// configuration rather than an assumption baked into the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Failures stay local to the ref that hit them; independent refs still
    /// complete.
    #[default]
    Isolate,
    /// The first action failure fails the batch.
    FailFast,
}

type UnitResult = std::result::Result<Vec<ArtifactPath>, UnitError>;

/// Schedules one batch of diagnostic builds.
///
/// The memo table lives as long as the scheduler, so construct a fresh
/// scheduler per invocation to keep deduplication invocation-scoped.
pub struct BuildScheduler {
    graph: Arc<dyn TargetGraph>,
    backend: Arc<dyn BuildBackend>,
    failure_mode: FailureMode,
    memo: Mutex<HashMap<String, Arc<OnceCell<UnitResult>>>>,
}

impl BuildScheduler {
    pub fn new(graph: Arc<dyn TargetGraph>, backend: Arc<dyn BuildBackend>) -> Self {
        Self {
            graph,
            backend,
            failure_mode: FailureMode::default(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Build every submitted ref, returning an outcome for each.
    ///
    /// Callers must not pass an empty batch; the pipeline short-circuits
    /// before reaching this point. Infrastructure failures abort the batch
    /// regardless of [`FailureMode`].
    pub async fn build_all(&self, refs: &[SubTargetRef]) -> Result<BuildReport> {
        debug_assert!(!refs.is_empty(), "empty batches are rejected upstream");

        let results = join_all(refs.iter().map(|reference| self.build_ref(reference))).await;

        let mut report = BuildReport::default();
        for (reference, result) in refs.iter().zip(results) {
            report.record(reference.clone(), result?);
        }
        Ok(report)
    }

    async fn build_ref(&self, reference: &SubTargetRef) -> Result<RefOutcome> {
        // Graph lookups are engine infrastructure; any failure here is fatal.
        let deps = self.graph.deps(&reference.label).await?;

        let dep_results = join_all(
            deps.iter()
                .map(|dep| self.build_memo(WorkUnit::Primary(dep.clone()))),
        )
        .await;

        for (dep, result) in deps.iter().zip(dep_results) {
            if let Err(err) = result {
                return self.absorb(reference, format!("dependency {dep} failed: {err}"), err);
            }
        }

        match self
            .build_memo(WorkUnit::Diagnostic(reference.clone()))
            .await
        {
            Ok(artifacts) => Ok(RefOutcome::Built(artifacts)),
            Err(err) => {
                let reason = err.to_string();
                self.absorb(reference, reason, err)
            }
        }
    }

    /// Build `unit` at most once per batch. Concurrent requesters for the
    /// same unit all await the same build and share its result, including a
    /// cached failure.
    async fn build_memo(&self, unit: WorkUnit) -> UnitResult {
        let key = unit.to_string();
        let cell = {
            let mut memo = self.memo.lock().await;
            memo.entry(key).or_default().clone()
        };

        if let Some(cached) = cell.get() {
            debug!(unit = %unit, "unit already built this batch");
            return cached.clone();
        }

        cell.get_or_init(|| async {
            debug!(unit = %unit, "building unit");
            self.backend.build_unit(&unit).await
        })
        .await
        .clone()
    }

    fn absorb(
        &self,
        reference: &SubTargetRef,
        reason: String,
        err: UnitError,
    ) -> Result<RefOutcome> {
        match err {
            UnitError::Infrastructure(message) => Err(EngineError::Infrastructure(message)),
            UnitError::Action(_) => match self.failure_mode {
                FailureMode::Isolate => {
                    debug!(reference = %reference, %reason, "target build failed");
                    Ok(RefOutcome::Failed(reason))
                }
                FailureMode::FailFast => Err(EngineError::BuildAborted {
                    reference: reference.to_string(),
                    reason,
                }),
            },
        }
    }
}
