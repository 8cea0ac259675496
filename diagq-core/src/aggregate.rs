//! Best-effort collection of one artifact per built ref.

use tracing::debug;

use crate::scheduler::{BuildReport, RefOutcome};
use crate::types::{ArtifactPath, SubTargetRef};

/// Collect the final artifact list: one entry per ref that produced exactly
/// one artifact, in submission order, with duplicate paths removed.
///
/// Refs that produced zero artifacts, more than one, or failed outright
/// contribute nothing and raise no error. Partial results are worth more to
/// diagnostic tooling than an all-or-nothing failure, so exclusions are
/// reported at debug level only.
pub fn collect_artifacts(refs: &[SubTargetRef], report: &BuildReport) -> Vec<ArtifactPath> {
    let mut seen = std::collections::HashSet::new();
    let mut artifacts = Vec::new();

    for reference in refs {
        match report.outcome(reference) {
            Some(RefOutcome::Built(produced)) if produced.len() == 1 => {
                let artifact = produced[0].clone();
                if seen.insert(artifact.clone()) {
                    artifacts.push(artifact);
                }
            }
            Some(RefOutcome::Built(produced)) => {
                debug!(
                    reference = %reference,
                    count = produced.len(),
                    "excluded: ref did not produce exactly one artifact"
                );
            }
            Some(RefOutcome::Failed(reason)) => {
                debug!(reference = %reference, %reason, "excluded: ref failed to build");
            }
            None => {
                debug!(reference = %reference, "excluded: no outcome recorded");
            }
        }
    }

    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;
    use crate::graph::StaticGraph;
    use crate::scheduler::{BuildBackend, BuildScheduler};
    use crate::types::{DiagnosticMode, TargetNode, WorkUnit};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct ScriptedBackend {
        script: HashMap<String, Result<Vec<ArtifactPath>, UnitError>>,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                script: HashMap::new(),
            }
        }

        fn built(mut self, unit: &str, artifacts: &[&str]) -> Self {
            self.script.insert(
                unit.to_string(),
                Ok(artifacts.iter().map(|a| ArtifactPath::from(*a)).collect()),
            );
            self
        }

        fn failed(mut self, unit: &str, reason: &str) -> Self {
            self.script
                .insert(unit.to_string(), Err(UnitError::Action(reason.to_string())));
            self
        }
    }

    #[async_trait]
    impl BuildBackend for ScriptedBackend {
        async fn build_unit(
            &self,
            unit: &WorkUnit,
        ) -> Result<Vec<ArtifactPath>, UnitError> {
            self.script
                .get(&unit.to_string())
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn refs_for(labels: &[&str]) -> Vec<SubTargetRef> {
        labels
            .iter()
            .map(|label| {
                SubTargetRef::for_node(&TargetNode::library(*label), DiagnosticMode::Compiler)
            })
            .collect()
    }

    async fn report_for(backend: ScriptedBackend, refs: &[SubTargetRef]) -> BuildReport {
        let scheduler = BuildScheduler::new(Arc::new(StaticGraph::new()), Arc::new(backend));
        scheduler.build_all(refs).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_artifact_refs_collected_in_submission_order() {
        let refs = refs_for(&["//b:b", "//a:a"]);
        let backend = ScriptedBackend::new()
            .built("//b:b[diag.json]", &["/out/b.diag.json"])
            .built("//a:a[diag.json]", &["/out/a.diag.json"]);

        let report = report_for(backend, &refs).await;
        let artifacts = collect_artifacts(&refs, &report);

        assert_eq!(
            artifacts,
            vec![
                ArtifactPath::from("/out/b.diag.json"),
                ArtifactPath::from("/out/a.diag.json"),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_and_many_artifact_refs_excluded() {
        let refs = refs_for(&["//none:none", "//many:many", "//one:one"]);
        let backend = ScriptedBackend::new()
            .built("//none:none[diag.json]", &[])
            .built(
                "//many:many[diag.json]",
                &["/out/many.1.json", "/out/many.2.json"],
            )
            .built("//one:one[diag.json]", &["/out/one.diag.json"]);

        let report = report_for(backend, &refs).await;
        let artifacts = collect_artifacts(&refs, &report);

        assert_eq!(artifacts, vec![ArtifactPath::from("/out/one.diag.json")]);
    }

    #[tokio::test]
    async fn test_failed_ref_excluded_without_error() {
        let refs = refs_for(&["//bad:bad", "//good:good"]);
        let backend = ScriptedBackend::new()
            .failed("//bad:bad[diag.json]", "rustc exited with 1")
            .built("//good:good[diag.json]", &["/out/good.diag.json"]);

        let report = report_for(backend, &refs).await;
        let artifacts = collect_artifacts(&refs, &report);

        assert_eq!(artifacts, vec![ArtifactPath::from("/out/good.diag.json")]);
    }

    #[tokio::test]
    async fn test_duplicate_paths_deduplicated_keeping_first() {
        let refs = refs_for(&["//a:a", "//b:b"]);
        let backend = ScriptedBackend::new()
            .built("//a:a[diag.json]", &["/out/shared.diag.json"])
            .built("//b:b[diag.json]", &["/out/shared.diag.json"]);

        let report = report_for(backend, &refs).await;
        let artifacts = collect_artifacts(&refs, &report);

        assert_eq!(artifacts, vec![ArtifactPath::from("/out/shared.diag.json")]);
    }
}
