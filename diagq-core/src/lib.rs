//! diagq core - target resolution and diagnostic-build orchestration.
//!
//! Given a source file, this crate resolves the build-graph targets that own
//! it, narrows them to the diagnosable rule kinds, builds one diagnostic
//! sub-target per surviving node, and collects exactly one artifact path per
//! node that produced one.
//!
//! The dependency graph and the per-unit build execution live in an external
//! engine, consumed through the [`TargetGraph`] and [`BuildBackend`] traits.
//! Everything per-target is best-effort: a node whose build fails or emits an
//! unexpected number of artifacts is dropped from the result, and only
//! engine-level failures abort a run.

pub mod aggregate;
pub mod error;
pub mod graph;
pub mod kind;
pub mod pipeline;
pub mod platform;
pub mod scheduler;
pub mod subtarget;
pub mod types;

pub use error::{EngineError, UnitError};
pub use graph::{StaticGraph, TargetGraph};
pub use pipeline::Pipeline;
pub use platform::PlatformSpec;
pub use scheduler::{BuildBackend, BuildReport, BuildScheduler, FailureMode, RefOutcome};
pub use types::{
    ArtifactPath, DiagnosticMode, SubTargetRef, TargetKind, TargetLabel, TargetNode, Universe,
    WorkUnit,
};
