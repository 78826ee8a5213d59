//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    AppState, Environment, Error,
    transaction::{NewTransaction, Transaction, core::create_transaction, from_cents, to_cents},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Controls the detail in error responses.
    pub environment: Environment,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
        }
    }
}

/// The JSON body for creating a transaction.
///
/// Fields are kept as raw JSON so that missing or malformed fields produce a
/// validation error that echoes what was received, rather than a generic
/// deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTransactionRequest {
    /// The ID of the user who owns the transaction.
    #[serde(default)]
    pub user_id: Option<Value>,
    /// A short description of the transaction.
    #[serde(default)]
    pub title: Option<Value>,
    /// The amount as a JSON number or a numeric string.
    #[serde(default)]
    pub amount: Option<Value>,
    /// The category name.
    #[serde(default)]
    pub category: Option<Value>,
}

impl CreateTransactionRequest {
    /// Check that every field is present and that the amount is a number.
    ///
    /// The amount is rounded to the nearest cent.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if a field is absent, null or an empty string,
    /// - or [Error::InvalidAmount] if the amount is not a number or numeric string,
    ///   or is too large to store.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let user_id = non_empty_string(&self.user_id);
        let title = non_empty_string(&self.title);
        let category = non_empty_string(&self.category);
        let amount_is_missing = match &self.amount {
            None | Some(Value::Null) => true,
            Some(Value::String(string)) => string.is_empty(),
            Some(_) => false,
        };

        let (Some(user_id), Some(title), Some(category), false) =
            (user_id, title, category, amount_is_missing)
        else {
            return Err(Error::MissingFields {
                received: self.received(),
            });
        };

        let amount = self
            .amount
            .as_ref()
            .and_then(parse_amount)
            .ok_or_else(|| Error::InvalidAmount {
                received: self.amount.clone().unwrap_or(Value::Null),
            })?;

        Ok(Transaction::build(user_id, title, amount, category))
    }

    fn received(&self) -> Value {
        let mut received = Map::new();

        for (key, value) in [
            ("user_id", &self.user_id),
            ("title", &self.title),
            ("amount", &self.amount),
            ("category", &self.category),
        ] {
            if let Some(value) = value {
                received.insert(key.to_owned(), value.clone());
            }
        }

        Value::Object(received)
    }
}

fn non_empty_string(value: &Option<Value>) -> Option<&str> {
    match value {
        Some(Value::String(string)) if !string.is_empty() => Some(string),
        _ => None,
    }
}

/// Read a JSON number or numeric string as an amount rounded to the cent.
fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(string) => string.trim().to_owned(),
        _ => return None,
    };

    let amount = text
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;

    to_cents(amount).map(from_cents)
}

/// A route handler for creating a new transaction, responds with the created
/// transaction and the status code 201.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Response {
    let result = payload
        .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))
        .and_then(|Json(request)| request.validate())
        .and_then(|new_transaction| {
            tracing::debug!("Attempting to insert transaction: {new_transaction:?}");

            let connection = state
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            create_transaction(new_transaction, &connection)
        });

    match result {
        Ok(transaction) => {
            tracing::info!("Created transaction {}", transaction.id);
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(error) => error.into_json_response(state.environment),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use crate::{
        AppState, Environment, Error, endpoints,
        transaction::{
            NewTransaction, Transaction, count_transactions, create_transaction_endpoint,
            create_transaction_endpoint::CreateTransactionRequest,
        },
    };

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        AppState::new(connection, Environment::Development).expect("Could not create app state")
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn request(body: Value) -> CreateTransactionRequest {
        serde_json::from_value(body).expect("Could not deserialize request")
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "user_id": "u1",
                "title": "Coffee",
                "amount": -4.5,
                "category": "Food & Drinks",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.amount, Decimal::new(-45, 1));
        assert_eq!(transaction.user_id, "u1");
        assert_eq!(transaction.title, "Coffee");
        assert_eq!(transaction.category, "Food & Drinks");
        assert!(transaction.id > 0);
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn missing_title_is_bad_request() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "user_id": "u1",
                "amount": -4.5,
                "category": "Food & Drinks",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "error": "All fields are required",
            "received": {
                "user_id": "u1",
                "amount": -4.5,
                "category": "Food & Drinks",
            },
        }));
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn non_numeric_amount_is_bad_request() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "user_id": "u1",
                "title": "Coffee",
                "amount": "four fifty",
                "category": "Food & Drinks",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "error": "Amount must be a number",
            "received": "four fifty",
        }));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .content_type("application/json")
            .text("{not json")
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert!(body["error"].is_string());
    }

    #[test]
    fn numeric_string_amount_is_accepted() {
        let result = request(json!({
            "user_id": "u1",
            "title": "Salary",
            "amount": " 1500.50 ",
            "category": "Income",
        }))
        .validate();

        assert_eq!(
            result,
            Ok(NewTransaction {
                user_id: "u1".to_owned(),
                title: "Salary".to_owned(),
                amount: Decimal::new(15005, 1),
                category: "Income".to_owned(),
            })
        );
    }

    #[test]
    fn zero_amount_is_accepted() {
        let result = request(json!({
            "user_id": "u1",
            "title": "Nothing",
            "amount": 0,
            "category": "Other",
        }))
        .validate();

        assert_eq!(
            result.map(|transaction| transaction.amount),
            Ok(Decimal::ZERO)
        );
    }

    #[test]
    fn amount_keeps_decimal_digits_exactly() {
        for (amount, want) in [
            (json!(0.1), Decimal::new(1, 1)),
            (json!(-0.3), Decimal::new(-3, 1)),
            (json!("19.99"), Decimal::new(1999, 2)),
            (json!(2.005), Decimal::new(201, 2)),
            (json!(1e3), Decimal::from(1000)),
        ] {
            let result = request(json!({
                "user_id": "u1",
                "title": "t",
                "amount": amount,
                "category": "Other",
            }))
            .validate();

            assert_eq!(
                result.map(|transaction| transaction.amount),
                Ok(want),
                "amount {amount}"
            );
        }
    }

    #[test]
    fn amount_too_large_to_store_is_rejected() {
        let result = request(json!({
            "user_id": "u1",
            "title": "Lottery",
            "amount": 1e300,
            "category": "Income",
        }))
        .validate();

        assert_eq!(
            result,
            Err(Error::InvalidAmount {
                received: json!(1e300)
            })
        );
    }

    #[test]
    fn non_finite_amount_is_rejected() {
        for amount in ["inf", "-Infinity", "NaN"] {
            let result = request(json!({
                "user_id": "u1",
                "title": "Coffee",
                "amount": amount,
                "category": "Food & Drinks",
            }))
            .validate();

            assert_eq!(
                result,
                Err(Error::InvalidAmount {
                    received: json!(amount)
                }),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let result = request(json!({
            "user_id": "",
            "title": "Coffee",
            "amount": "",
            "category": "Food & Drinks",
        }))
        .validate();

        assert!(
            matches!(result, Err(Error::MissingFields { .. })),
            "want MissingFields, got {result:?}"
        );
    }

    #[test]
    fn non_string_title_counts_as_missing() {
        let result = request(json!({
            "user_id": "u1",
            "title": 42,
            "amount": -1,
            "category": "Other",
        }))
        .validate();

        assert!(
            matches!(result, Err(Error::MissingFields { .. })),
            "want MissingFields, got {result:?}"
        );
    }

    #[test]
    fn boolean_amount_is_not_a_number() {
        let result = request(json!({
            "user_id": "u1",
            "title": "Coffee",
            "amount": true,
            "category": "Other",
        }))
        .validate();

        assert_eq!(
            result,
            Err(Error::InvalidAmount {
                received: json!(true)
            })
        );
    }
}
