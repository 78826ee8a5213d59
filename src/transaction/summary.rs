//! Aggregates a user's transactions into their balance, income and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, Environment, Error, transaction::from_cents};

/// The totals of a user's transactions.
///
/// `balance` is always exactly `income + expense`. The totals are serialized
/// as JSON numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// The sum of positive amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// The sum of negative amounts, so this is zero or less.
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// Calculate the [Summary] for `user_id`.
///
/// Each total is a separate query over the stored cents, so the totals are
/// exact. A user with no transactions gets zero for every total.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_summary(user_id: &str, connection: &Connection) -> Result<Summary, Error> {
    let sum_where = |condition: &str| -> Result<Decimal, Error> {
        connection
            .query_row(
                &format!(
                    "SELECT COALESCE(SUM(amount), 0) FROM transactions
                     WHERE user_id = :user_id{condition}"
                ),
                &[(":user_id", &user_id)],
                |row| row.get(0).map(from_cents),
            )
            .map_err(Error::from)
    };

    let balance = sum_where("")?;
    let income = sum_where(" AND amount > 0")?;
    let expense = sum_where(" AND amount < 0")?;

    Ok(Summary {
        balance,
        income,
        expense,
    })
}

/// The state needed to summarize a user's transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Controls the detail in error responses.
    pub environment: Environment,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
        }
    }
}

/// A route handler for getting the balance, income and expenses of a user.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Path(user_id): Path<String>,
) -> Response {
    let summary = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_summary(&user_id, &connection));

    match summary {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            tracing::error!("Could not get summary for user {user_id}: {error}");
            error.into_json_response(state.environment)
        }
    }
}
