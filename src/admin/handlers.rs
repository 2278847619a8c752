use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::BackendAddress;
use crate::error::ProxyError;
use crate::http::server::AppState;
use crate::routing::admin_subcommand;

/// Sub-commands of the admin namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    SeleniumAddress,
    Enabled,
}

impl AdminCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "selenium_address" => Some(AdminCommand::SeleniumAddress),
            "enabled" => Some(AdminCommand::Enabled),
            _ => None,
        }
    }
}

/// `{"value": ...}` envelope used in both directions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValueEnvelope<T> {
    pub value: T,
}

pub async fn handle_admin(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let name = admin_subcommand(request.uri().path()).to_string();
    let command =
        AdminCommand::parse(&name).ok_or_else(|| ProxyError::AdminUnknownCommand(name))?;

    let method = request.method().clone();
    let runtime = &state.runtime;

    match (command, method) {
        (AdminCommand::SeleniumAddress, Method::GET) => {
            Ok(value_response(runtime.backend().as_str().to_string()))
        }
        (AdminCommand::SeleniumAddress, Method::POST) => {
            let address: String = read_value(request.into_body(), state.admin.max_body_bytes).await?;
            let backend = BackendAddress::parse(&address)
                .map_err(|e| ProxyError::AdminBadRequest(e.to_string()))?;
            tracing::info!(selenium_address = %backend, "Backend address updated");
            runtime.set_backend(backend);
            Ok(StatusCode::OK.into_response())
        }
        (AdminCommand::Enabled, Method::GET) => Ok(value_response(runtime.stabilization_enabled())),
        (AdminCommand::Enabled, Method::POST) => {
            let enabled: bool = read_value(request.into_body(), state.admin.max_body_bytes).await?;
            tracing::info!(enabled, "Stabilization toggled");
            runtime.set_stabilization_enabled(enabled);
            Ok(StatusCode::OK.into_response())
        }
        _ => Err(ProxyError::AdminBadMethod),
    }
}

fn value_response<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(ValueEnvelope { value })).into_response()
}

async fn read_value<T: DeserializeOwned>(body: Body, limit: usize) -> Result<T, ProxyError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::AdminBadRequest(e.to_string()))?;
    let envelope: ValueEnvelope<T> = serde_json::from_slice(&bytes)
        .map_err(|e| ProxyError::AdminBadRequest(e.to_string()))?;
    Ok(envelope.value)
}
