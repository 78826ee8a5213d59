//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Environment, Error,
    database_id::TransactionId,
    transaction::{Transaction, core::delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Controls the detail in error responses.
    pub environment: Environment,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
        }
    }
}

/// The response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionResponse {
    /// A confirmation message for the client.
    pub message: String,
    /// The transaction as it was before it was deleted.
    pub deleted_transaction: Transaction,
}

/// A route handler for deleting a transaction, responds with the deleted transaction.
///
/// Any transaction can be deleted by its ID, regardless of which user owns it.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(raw_id): Path<String>,
) -> Response {
    let deleted = parse_transaction_id(&raw_id).and_then(|transaction_id| {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        delete_transaction(transaction_id, &connection)
    });

    match deleted {
        Ok(transaction) => Json(DeleteTransactionResponse {
            message: "Transaction deleted successfully".to_owned(),
            deleted_transaction: transaction,
        })
        .into_response(),
        Err(error) => {
            tracing::debug!("Could not delete transaction {raw_id}: {error}");
            error.into_json_response(state.environment)
        }
    }
}

fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    raw_id
        .trim()
        .parse()
        .map_err(|_| Error::InvalidTransactionId(raw_id.to_owned()))
}
