//! Liveness endpoint

use aide::axum::IntoApiResponse;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

/// Body of `GET /health`
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// Crate version of the running service
    version: &'static str,
    /// Commit hash of the current build (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    rev: Option<&'static str>,
}

/// Liveness probe
///
/// Does not touch the blob store, the record store or the media tools.
pub async fn handler() -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
    })
}
