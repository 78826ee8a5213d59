//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID the authentication provider issued to the user who owns this transaction.
    pub user_id: String,
    /// A short description of what the transaction was for.
    pub title: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Positive values represent income, negative values represent expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// The category of the transaction, e.g. "Food & Drinks", "Bills".
    pub category: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(user_id: &str, title: &str, amount: Decimal, category: &str) -> NewTransaction {
        NewTransaction {
            user_id: user_id.to_owned(),
            title: title.to_owned(),
            amount,
            category: category.to_owned(),
        }
    }
}

/// The fields needed to insert a [Transaction].
///
/// The ID and creation time are set by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The ID of the user who owns the transaction.
    ///
    /// This is an opaque string from the authentication provider and is not
    /// checked against any local table.
    pub user_id: String,

    /// A short, human-readable description of the transaction.
    ///
    /// # Examples
    /// - `"Coffee"`
    /// - `"Salary - January 2025"`
    pub title: String,

    /// The monetary amount of the transaction.
    ///
    /// The sign encodes the direction of the transaction: money flowing into
    /// the user's account is positive and money flowing out is negative.
    /// Zero is allowed. Amounts are stored to the cent, see [to_cents].
    ///
    /// # Examples
    /// - `150.00` - Salary deposit
    /// - `-4.50` - Coffee shop purchase
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// The category of the transaction, e.g. "Food & Drinks", "Transportation".
    ///
    /// This is free text; clients map known names to icons.
    pub category: String,
}

/// The number of decimal places amounts are stored with.
const AMOUNT_SCALE: u32 = 2;

/// Round `amount` to the nearest cent, with halves rounded away from zero,
/// and return it as a whole number of cents.
///
/// Returns `None` if the number of cents does not fit in an `i64`.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    amount
        .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Convert a whole number of cents back into an amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// The amount is rounded to the nearest cent.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is too large to store,
/// - [Error::InsertReturnedNoRows] if the insert did not return the new row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let cents = to_cents(new_transaction.amount).ok_or_else(|| Error::InvalidAmount {
        received: Value::String(new_transaction.amount.to_string()),
    })?;

    connection
        .prepare(
            "INSERT INTO transactions (user_id, title, amount, category)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, title, amount, category, created_at",
        )?
        .query_row(
            (
                new_transaction.user_id,
                new_transaction.title,
                cents,
                new_transaction.category,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InsertReturnedNoRows,
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, title, amount, category, created_at
             FROM transactions WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all of a user's transactions, newest first.
///
/// Transactions created within the same millisecond are ordered by
/// descending ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_user(
    user_id: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, amount, category, created_at
             FROM transactions
             WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction with `id` and return its contents.
///
/// No check is made on who owns the transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "DELETE FROM transactions WHERE id = :id
             RETURNING id, user_id, title, amount, category, created_at",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingTransaction,
            error => error.into(),
        })
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// `amount` is stored in whole cents. `created_at` is filled in by SQLite
/// with the current UTC time to the millisecond.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                amount INTEGER NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
                )",
        (),
    )?;

    // Listing and summaries always filter on the user.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_created
         ON transactions(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let title = row.get(2)?;
    let amount = from_cents(row.get(3)?);
    let category = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Transaction {
        id,
        user_id,
        title,
        amount,
        category,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Transaction, count_transactions, create_transaction, delete_transaction,
            from_cents, get_transaction, get_transactions_by_user, to_cents,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_with_created_at(
        conn: &Connection,
        user_id: &str,
        title: &str,
        created_at: OffsetDateTime,
    ) {
        conn.execute(
            "INSERT INTO transactions (user_id, title, amount, category, created_at)
             VALUES (?1, ?2, -100, 'Other', ?3)",
            (user_id, title, created_at),
        )
        .expect("Could not insert transaction");
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = Decimal::new(-45, 1);

        let result = create_transaction(
            Transaction::build("u1", "Coffee", amount, "Food & Drinks"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.user_id, "u1");
                assert_eq!(transaction.title, "Coffee");
                assert_eq!(transaction.category, "Food & Drinks");
                assert!(transaction.id > 0);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_sets_created_at_to_now() {
        let conn = get_test_connection();
        let before = OffsetDateTime::now_utc() - time::Duration::seconds(1);

        let transaction =
            create_transaction(Transaction::build("u1", "Salary", Decimal::from(100), "Income"), &conn)
                .unwrap();

        let after = OffsetDateTime::now_utc() + time::Duration::seconds(1);
        assert!(
            before <= transaction.created_at && transaction.created_at <= after,
            "created_at {} is not between {before} and {after}",
            transaction.created_at
        );
    }

    #[test]
    fn create_accepts_zero_amount() {
        let conn = get_test_connection();

        let transaction =
            create_transaction(Transaction::build("u1", "Nothing", Decimal::ZERO, "Other"), &conn)
                .unwrap();

        assert_eq!(transaction.amount, Decimal::ZERO);
    }

    #[test]
    fn get_returns_created_transaction() {
        let conn = get_test_connection();
        let created =
            create_transaction(Transaction::build("u1", "Bus", Decimal::from(-3), "Transportation"), &conn)
                .unwrap();

        let fetched = get_transaction(created.id, &conn);

        assert_eq!(fetched, Ok(created));
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_only_returns_users_transactions() {
        let conn = get_test_connection();
        create_transaction(Transaction::build("u1", "Mine", Decimal::NEGATIVE_ONE, "Other"), &conn).unwrap();
        create_transaction(Transaction::build("u2", "Theirs", Decimal::from(-2), "Other"), &conn).unwrap();

        let transactions = get_transactions_by_user("u1", &conn).unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Mine");
    }

    #[test]
    fn list_returns_newest_first() {
        let conn = get_test_connection();
        insert_with_created_at(&conn, "u1", "middle", datetime!(2025-06-02 12:00 UTC));
        insert_with_created_at(&conn, "u1", "oldest", datetime!(2025-06-01 12:00 UTC));
        insert_with_created_at(&conn, "u1", "newest", datetime!(2025-06-03 12:00 UTC));

        let titles: Vec<String> = get_transactions_by_user("u1", &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.title)
            .collect();

        assert_eq!(titles, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn list_breaks_ties_by_newest_id() {
        let conn = get_test_connection();
        let created_at = datetime!(2025-06-01 12:00 UTC);
        insert_with_created_at(&conn, "u1", "first", created_at);
        insert_with_created_at(&conn, "u1", "second", created_at);

        let transactions = get_transactions_by_user("u1", &conn).unwrap();

        assert_eq!(transactions[0].title, "second");
        assert_eq!(transactions[1].title, "first");
        for pair in transactions.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn list_is_empty_for_unknown_user() {
        let conn = get_test_connection();

        assert_eq!(get_transactions_by_user("nobody", &conn), Ok(vec![]));
    }

    #[test]
    fn delete_returns_deleted_transaction() {
        let conn = get_test_connection();
        let created =
            create_transaction(Transaction::build("u1", "Rent", Decimal::from(-1200), "Bills"), &conn).unwrap();

        let deleted = delete_transaction(created.id, &conn);

        assert_eq!(deleted, Ok(created.clone()));
        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn delete_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(
            delete_transaction(1337, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn delete_only_removes_one_row() {
        let conn = get_test_connection();
        let first = create_transaction(Transaction::build("u1", "A", Decimal::ONE, "Other"), &conn).unwrap();
        create_transaction(Transaction::build("u1", "B", Decimal::TWO, "Other"), &conn).unwrap();

        delete_transaction(first.id, &conn).unwrap();

        assert_eq!(count_transactions(&conn), Ok(1));
    }

    #[test]
    fn create_rounds_amount_to_cents() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build("u1", "Odd", Decimal::new(-12345, 3), "Other"),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.amount, Decimal::new(-1235, 2));
    }

    #[test]
    fn create_fails_on_amount_too_large_to_store() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build("u1", "Huge", Decimal::MAX, "Other"),
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::InvalidAmount {
                received: Value::String(Decimal::MAX.to_string())
            })
        );
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn cents_conversion_is_exact() {
        assert_eq!(to_cents(Decimal::new(1, 1)), Some(10));
        assert_eq!(to_cents(Decimal::new(-3, 1)), Some(-30));
        assert_eq!(to_cents(Decimal::new(5, 3)), Some(1));
        assert_eq!(to_cents(Decimal::new(-5, 3)), Some(-1));
        assert_eq!(to_cents(Decimal::MAX), None);
        assert_eq!(from_cents(-450), Decimal::new(-45, 1));
    }
}
