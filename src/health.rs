//! A route for checking whether the server is up.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

/// The body of a health check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "success" when the server can respond.
    pub status: String,
    /// A human-readable description of the status.
    pub message: String,
}

/// Respond with 200 OK while the server is running.
pub async fn get_health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "success".to_owned(),
            message: "Server is running".to_owned(),
        }),
    )
}
