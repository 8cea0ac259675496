//! HTTP client for the graph/build engine daemon.
//!
//! Implements both service seams the core consumes: ownership/dependency
//! queries ([`TargetGraph`]) and per-unit build execution ([`BuildBackend`]).
//! Transport problems - connection failures, timeouts, non-2xx statuses -
//! map to infrastructure errors and abort the run; a build request that the
//! engine answers with `status = "failed"` is an action failure scoped to
//! that unit.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use diagq_core::error::Result;
use diagq_core::platform::PlatformSpec;
use diagq_core::{
    ArtifactPath, BuildBackend, EngineError, TargetGraph, TargetKind, TargetLabel, TargetNode,
    UnitError, Universe, WorkUnit,
};

/// Client for one engine daemon.
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    platform: Option<String>,
    constraints: Vec<String>,
}

impl EngineClient {
    pub fn new(
        base_url: impl Into<String>,
        platform: &PlatformSpec,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EngineError::Infrastructure(format!("http client setup: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform: platform.resolved(),
            constraints: platform.constraints().to_vec(),
        })
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| EngineError::Infrastructure(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Infrastructure(format!(
                "{url} returned {status}"
            )));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|err| EngineError::Protocol(format!("invalid response from {url}: {err}")))
    }
}

#[derive(Debug, Serialize)]
struct OwnersRequest<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    universe: Option<Vec<&'a str>>,
}

#[derive(Debug, Deserialize)]
struct OwnersResponse {
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    label: String,
    kind: String,
}

impl RawTarget {
    fn into_node(self) -> TargetNode {
        TargetNode::new(self.label, TargetKind::parse(&self.kind))
    }
}

#[derive(Debug, Serialize)]
struct DepsRequest<'a> {
    label: &'a str,
}

#[derive(Debug, Deserialize)]
struct DepsResponse {
    deps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BuildRequest<'a> {
    unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    constraints: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BuildResponse {
    status: String,
    #[serde(default)]
    artifacts: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl TargetGraph for EngineClient {
    async fn owners(&self, file: &str) -> Result<Vec<TargetNode>> {
        let response: OwnersResponse = self
            .post(
                "api/owners",
                &OwnersRequest {
                    file,
                    universe: None,
                },
            )
            .await?;
        Ok(response.targets.into_iter().map(RawTarget::into_node).collect())
    }

    async fn owners_in(&self, file: &str, universe: &Universe) -> Result<Vec<TargetNode>> {
        let labels: Vec<&str> = universe.labels().iter().map(TargetLabel::as_str).collect();
        let response: OwnersResponse = self
            .post(
                "api/owners",
                &OwnersRequest {
                    file,
                    universe: Some(labels),
                },
            )
            .await?;
        Ok(response.targets.into_iter().map(RawTarget::into_node).collect())
    }

    async fn deps(&self, label: &TargetLabel) -> Result<Vec<TargetLabel>> {
        let response: DepsResponse = self
            .post(
                "api/deps",
                &DepsRequest {
                    label: label.as_str(),
                },
            )
            .await?;
        Ok(response.deps.into_iter().map(TargetLabel::from).collect())
    }
}

#[async_trait]
impl BuildBackend for EngineClient {
    async fn build_unit(
        &self,
        unit: &WorkUnit,
    ) -> std::result::Result<Vec<ArtifactPath>, UnitError> {
        let request = BuildRequest {
            unit: unit.to_string(),
            platform: self.platform.as_deref(),
            constraints: &self.constraints,
        };

        let response: BuildResponse = self
            .post("api/build", &request)
            .await
            .map_err(|err| UnitError::Infrastructure(err.to_string()))?;

        match response.status.as_str() {
            "built" => Ok(response
                .artifacts
                .into_iter()
                .map(ArtifactPath::new)
                .collect()),
            "failed" => Err(UnitError::Action(
                response
                    .error
                    .unwrap_or_else(|| "engine reported failure without detail".to_string()),
            )),
            other => Err(UnitError::Infrastructure(format!(
                "unknown build status {other:?}"
            ))),
        }
    }
}
