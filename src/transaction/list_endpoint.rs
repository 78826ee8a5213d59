//! Defines the endpoint for listing a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Environment, Error, transaction::core::get_transactions_by_user};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Controls the detail in error responses.
    pub environment: Environment,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
        }
    }
}

/// A route handler for getting all of a user's transactions, newest first.
///
/// The user ID is taken as-is from the path, there is no format validation.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Path(user_id): Path<String>,
) -> Response {
    let transactions = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_transactions_by_user(&user_id, &connection));

    match transactions {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => {
            tracing::error!("Could not fetch transactions for user {user_id}: {error}");
            error.into_json_response(state.environment)
        }
    }
}
