//! A client for the transaction API, for use by front ends.
//!
//! [ApiClient] is a thin wrapper over the REST endpoints. [TransactionsHook]
//! builds on it to keep a user's transactions and summary in memory, refetching
//! them after a mutation, and reports failures through an [Alerter].

mod api;
mod category;
mod form;
mod hook;

pub use api::{ApiClient, ClientError};
pub use category::{CATEGORIES, Category, DEFAULT_CATEGORY_ICON, category_icon};
pub use form::NewTransactionForm;
pub use hook::{Alerter, LogAlerter, TransactionsHook};
