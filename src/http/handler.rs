//! Per-request dispatch.
//!
//! ```text
//! Received → AdminDispatch        → Completed
//!          → StabilizeThenForward → Completed
//!          → ForwardDirect        → Completed
//! ```
//!
//! A stabilized command is held, body unread, until its probe response
//! has been fully read and interpreted. A failed probe answers 500 and
//! the command is never sent.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::HeaderName,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::admin::handle_admin;
use crate::config::ConfigSnapshot;
use crate::error::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{is_admin_command, requires_stabilization};
use crate::stabilize::StabilizationOutcome;

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Branch taken for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Admin,
    StabilizeThenForward,
    ForwardDirect,
}

impl Dispatch {
    pub fn classify(path: &str, stabilization_enabled: bool) -> Self {
        if is_admin_command(path) {
            Dispatch::Admin
        } else if requires_stabilization(path, stabilization_enabled) {
            Dispatch::StabilizeThenForward
        } else {
            Dispatch::ForwardDirect
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Dispatch::Admin => "admin",
            Dispatch::StabilizeThenForward => "stabilized",
            Dispatch::ForwardDirect => "direct",
        }
    }
}

/// Main proxy handler.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Captured once; admin writes during this exchange apply to later requests.
    let snapshot = state.runtime.snapshot();
    let dispatch = Dispatch::classify(&path, snapshot.stabilization_enabled);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        dispatch = ?dispatch,
        "Dispatching request"
    );

    let result = match dispatch {
        Dispatch::Admin => handle_admin(&state, request).await,
        Dispatch::StabilizeThenForward => stabilize_then_forward(&state, &snapshot, request).await,
        Dispatch::ForwardDirect => forward(&state, &snapshot, request).await,
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = e.status_code().as_u16(),
                error = %e,
                "Request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), dispatch.kind(), start);
    response
}

async fn stabilize_then_forward(
    state: &AppState,
    snapshot: &ConfigSnapshot,
    request: Request,
) -> Result<Response, ProxyError> {
    let path = request.uri().path().to_string();
    let outcome = state
        .stabilizer
        .stabilize(&state.connector, snapshot.backend.url(), &path)
        .await;

    match outcome {
        StabilizationOutcome::Stable => forward(state, snapshot, request).await,
        StabilizationOutcome::Failed(failure) => Err(failure.into()),
    }
}

/// Stream the request upstream and the response back, status and
/// headers verbatim.
async fn forward(
    state: &AppState,
    snapshot: &ConfigSnapshot,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let response = state
        .connector
        .forward(snapshot.backend.url(), parts.method, &path_and_query, parts.headers, body)
        .await?;

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, Body::new(body)))
}
