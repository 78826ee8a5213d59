//! Validation for the create transaction form.

use rust_decimal::Decimal;

use crate::{
    client::ClientError,
    transaction::{NewTransaction, Transaction},
};

/// The values entered on the create transaction form.
///
/// The amount is entered as a positive number and `is_expense` chooses its sign.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTransactionForm {
    /// What the transaction was for.
    pub title: String,
    /// The amount as typed by the user.
    pub amount: String,
    /// The name of the selected category, empty if none is selected.
    pub category: String,
    /// Whether the transaction is an expense (negative) rather than income.
    pub is_expense: bool,
}

impl NewTransactionForm {
    /// Check the form and build the transaction to send for `user_id`.
    ///
    /// # Errors
    /// Returns [ClientError::InvalidForm] with a message for the user if the
    /// title is blank, the amount is not a positive number, or no category
    /// is selected.
    pub fn validate(&self, user_id: &str) -> Result<NewTransaction, ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::InvalidForm("Please enter a title".to_owned()));
        }

        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| ClientError::InvalidForm("Please enter a valid amount".to_owned()))?;

        if self.category.is_empty() {
            return Err(ClientError::InvalidForm(
                "Please select a category".to_owned(),
            ));
        }

        let amount = if self.is_expense { -amount } else { amount };

        Ok(Transaction::build(
            user_id,
            &self.title,
            amount,
            &self.category,
        ))
    }
}
