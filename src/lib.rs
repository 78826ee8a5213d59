//! Expense Tracker is a backend for tracking personal income and expenses.
//!
//! This library provides a JSON REST API over a single table of transactions,
//! plus a [client] for consuming that API from a front end.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::{Value, json};
use tokio::signal;

mod app_state;
pub mod client;
mod database_id;
mod db;
pub mod endpoints;
mod environment;
mod health;
mod logging;
mod not_found;
mod routing;
pub mod transaction;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use environment::Environment;
pub use health::HealthStatus;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more of the fields needed to create a transaction was missing
    /// or empty.
    ///
    /// `received` holds the fields as they were submitted so the client can
    /// see what the server got.
    #[error("All fields are required")]
    MissingFields {
        /// The submitted fields, with absent fields omitted.
        received: Value,
    },

    /// The amount for a new transaction is not a number, or is too large to store.
    #[error("Amount must be a number")]
    InvalidAmount {
        /// The amount as it was submitted.
        received: Value,
    },

    /// The transaction ID in the request path is not an integer.
    #[error("Invalid transaction ID")]
    InvalidTransactionId(String),

    /// The request body could not be parsed as a JSON object.
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// The insert statement for a new transaction did not return the new row.
    #[error("no data returned from insert")]
    InsertReturnedNoRows,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response(Environment::Production)
    }
}

impl Error {
    /// The HTTP status code the client should receive for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields { .. }
            | Error::InvalidAmount { .. }
            | Error::InvalidTransactionId(_)
            | Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::InsertReturnedNoRows | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert the error into a JSON error envelope.
    ///
    /// Server errors only carry a generic message, unless `environment` is
    /// [Environment::Development] in which case the error text is included
    /// under `details`.
    pub(crate) fn into_json_response(self, environment: Environment) -> Response {
        let status = self.status_code();

        let body = match self {
            Error::MissingFields { ref received } | Error::InvalidAmount { ref received } => {
                json!({ "error": self.to_string(), "received": received })
            }
            Error::InsertReturnedNoRows | Error::SqlError(_) | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);

                if environment.is_production() {
                    json!({ "error": "Internal server error" })
                } else {
                    json!({ "error": "Internal server error", "details": self.to_string() })
                }
            }
            error => json!({ "error": error.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
