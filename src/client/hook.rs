//! An in-memory view of a user's transactions that stays in sync with the API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    TransactionId,
    client::{ApiClient, ClientError, NewTransactionForm},
    transaction::{Summary, Transaction},
};

/// Shows short messages to the user, e.g. as a dialog.
pub trait Alerter: Send + Sync {
    /// Show `message` under the heading `title`.
    fn alert(&self, title: &str, message: &str);
}

/// An [Alerter] that writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, title: &str, message: &str) {
        tracing::info!("{title}: {message}");
    }
}

#[derive(Debug, Default)]
struct HookState {
    transactions: Vec<Transaction>,
    summary: Summary,
    loads_in_flight: usize,
    last_error: Option<String>,
}

/// Marks a load as in flight until dropped.
struct LoadingGuard<'a> {
    state: &'a Mutex<HookState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
    }
}

/// Fetches and holds the transactions and summary for one user.
///
/// Requests are neither cancelled nor de-duplicated. If several loads are in
/// flight at once, each field holds whichever response resolved last.
///
/// Failures are logged, kept as [TransactionsHook::last_error] and shown
/// through the [Alerter]. Nothing is retried.
#[derive(Clone)]
pub struct TransactionsHook {
    client: ApiClient,
    user_id: Option<String>,
    state: Arc<Mutex<HookState>>,
    alerter: Arc<dyn Alerter>,
}

impl TransactionsHook {
    /// Create a hook for the signed in user, if there is one.
    ///
    /// Without a `user_id`, loading is a no-op and creating fails.
    pub fn new(client: ApiClient, user_id: Option<String>) -> Self {
        Self {
            client,
            user_id,
            state: Arc::new(Mutex::new(HookState::default())),
            alerter: Arc::new(LogAlerter),
        }
    }

    /// Show alerts with `alerter` instead of logging them.
    pub fn with_alerter(mut self, alerter: Arc<dyn Alerter>) -> Self {
        self.alerter = alerter;
        self
    }

    /// The most recently fetched transactions, newest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.state().transactions.clone()
    }

    /// The most recently fetched summary.
    pub fn summary(&self) -> Summary {
        self.state().summary
    }

    /// Whether any load is in progress.
    pub fn is_loading(&self) -> bool {
        self.state().loads_in_flight > 0
    }

    /// The message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    fn state(&self) -> MutexGuard<'_, HookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_loading(&self) -> LoadingGuard<'_> {
        self.state().loads_in_flight += 1;
        LoadingGuard { state: &self.state }
    }

    /// Fetch the transactions and summary at the same time.
    pub async fn load_data(&self) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };

        let _loading = self.start_loading();

        tokio::join!(
            self.fetch_transactions(user_id),
            self.fetch_summary(user_id)
        );
    }

    async fn fetch_transactions(&self, user_id: &str) {
        match self.client.get_transactions(user_id).await {
            Ok(transactions) => self.state().transactions = transactions,
            Err(error) => self.report("Error fetching transactions", &error),
        }
    }

    async fn fetch_summary(&self, user_id: &str) {
        match self.client.get_summary(user_id).await {
            Ok(summary) => self.state().summary = summary,
            Err(error) => self.report("Error fetching summary", &error),
        }
    }

    /// Delete a transaction, then reload the transactions and summary.
    ///
    /// # Errors
    /// Returns the error from the API if the delete failed, in which case
    /// nothing is reloaded.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, ClientError> {
        match self.client.delete_transaction(id).await {
            Ok(transaction) => {
                self.load_data().await;
                self.alerter
                    .alert("Success", "Transaction deleted successfully");
                Ok(transaction)
            }
            Err(error) => {
                self.report("Error deleting transaction", &error);
                Err(error)
            }
        }
    }

    /// Validate `form`, create the transaction, then reload the transactions and summary.
    ///
    /// # Errors
    /// Returns a:
    /// - [ClientError::MissingUserId] if there is no signed in user,
    /// - [ClientError::InvalidForm] if the form is invalid,
    /// - or the error from the API if the create failed.
    pub async fn create_transaction(
        &self,
        form: &NewTransactionForm,
    ) -> Result<Transaction, ClientError> {
        let user_id = self.user_id.as_deref().ok_or(ClientError::MissingUserId)?;

        let new_transaction = form.validate(user_id).inspect_err(|error| {
            self.alerter.alert("Error", &error.to_string());
        })?;

        match self.client.create_transaction(&new_transaction).await {
            Ok(transaction) => {
                self.alerter
                    .alert("Success", "Transaction created successfully");
                self.load_data().await;
                Ok(transaction)
            }
            Err(error) => {
                tracing::error!("Error creating transaction: {error}");
                self.state().last_error = Some(error.to_string());
                self.alerter.alert("Error", "Failed to create transaction");
                Err(error)
            }
        }
    }

    fn report(&self, context: &str, error: &ClientError) {
        tracing::error!("{context}: {error}");
        self.state().last_error = Some(error.to_string());
        self.alerter.alert("Error", &error.to_string());
    }
}
