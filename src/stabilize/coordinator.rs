//! Stabilization probe coordination.
//!
//! # Responsibilities
//! - Issue the `execute_async` probe for a command's session
//! - Read the probe response under a size cap and an optional deadline
//! - Interpret the response into a single StabilizationOutcome

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::config::StabilizationConfig;
use crate::observability::metrics;
use crate::routing::derive_probe_path;
use crate::stabilize::script::{readiness_script, ProbePayload};
use crate::upstream::UpstreamConnector;

/// Why a probe did not report a stable page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// The probe exchange itself failed.
    #[error("{0}")]
    Transport(String),

    /// The in-page check reported an error.
    #[error("Error while waiting for page to stabilize: {0}")]
    Page(String),

    #[error("Malformed stabilization response: {0}")]
    Malformed(String),

    #[error("Timed out after {0:?} waiting for page to stabilize")]
    Timeout(Duration),
}

impl ProbeFailure {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::Transport(_) => "transport",
            ProbeFailure::Page(_) => "page_error",
            ProbeFailure::Malformed(_) => "malformed",
            ProbeFailure::Timeout(_) => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StabilizationOutcome {
    Stable,
    Failed(ProbeFailure),
}

impl StabilizationOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            StabilizationOutcome::Stable => "stable",
            StabilizationOutcome::Failed(failure) => failure.kind(),
        }
    }
}

/// Issues stabilization probes. Holds the encoded payload so every
/// probe sends the same bytes.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    payload: String,
    max_response_bytes: usize,
    timeout: Option<Duration>,
}

impl Stabilizer {
    pub fn new(
        config: &StabilizationConfig,
        timeout: Option<Duration>,
    ) -> serde_json::Result<Self> {
        let script = match &config.script {
            Some(script) => script.clone(),
            None => readiness_script(config.strategy, &config.root_selector),
        };

        Ok(Self {
            payload: ProbePayload::new(script).to_body()?,
            max_response_bytes: config.max_response_bytes,
            timeout,
        })
    }

    /// Encoded probe body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Wait for the page behind `original_path`'s session to stabilize.
    ///
    /// Resolves once the probe response has been fully read.
    pub async fn stabilize(
        &self,
        connector: &UpstreamConnector,
        backend: &Url,
        original_path: &str,
    ) -> StabilizationOutcome {
        let start = Instant::now();
        let probe_path = derive_probe_path(original_path);

        tracing::debug!(probe_path = %probe_path, "Sending stabilization probe");

        let exchange = self.probe(connector, backend, &probe_path);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(ProbeFailure::Timeout(limit))),
            None => exchange.await,
        };

        let outcome = match result {
            Ok(()) => StabilizationOutcome::Stable,
            Err(failure) => StabilizationOutcome::Failed(failure),
        };

        let elapsed = start.elapsed();
        match &outcome {
            StabilizationOutcome::Stable => {
                tracing::debug!(probe_path = %probe_path, elapsed = ?elapsed, "Page stable")
            }
            StabilizationOutcome::Failed(failure) => tracing::warn!(
                probe_path = %probe_path,
                elapsed = ?elapsed,
                kind = failure.kind(),
                error = %failure,
                "Stabilization failed"
            ),
        }
        metrics::record_probe(outcome.kind(), start);

        outcome
    }

    async fn probe(
        &self,
        connector: &UpstreamConnector,
        backend: &Url,
        probe_path: &str,
    ) -> Result<(), ProbeFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );

        let response = connector
            .forward(
                backend,
                Method::POST,
                probe_path,
                headers,
                Body::from(self.payload.clone()),
            )
            .await
            .map_err(|e| ProbeFailure::Transport(e.to_string()))?;

        let body = axum::body::to_bytes(Body::new(response.into_body()), self.max_response_bytes)
            .await
            .map_err(|e| ProbeFailure::Transport(format!("failed to read probe response: {e}")))?;

        interpret_probe_response(&body)
    }
}

/// A falsy or missing `value` means stable; anything else is the page's
/// error message.
pub fn interpret_probe_response(body: &[u8]) -> Result<(), ProbeFailure> {
    let parsed: Value =
        serde_json::from_slice(body).map_err(|e| ProbeFailure::Malformed(e.to_string()))?;

    let Value::Object(fields) = parsed else {
        return Err(ProbeFailure::Malformed("expected a JSON object".to_string()));
    };

    match fields.get("value") {
        Some(value) if is_truthy(value) => Err(ProbeFailure::Page(match value {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        })),
        _ => Ok(()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
