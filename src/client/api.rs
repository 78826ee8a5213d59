//! A typed wrapper over the transaction REST API.

use reqwest::{Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    HealthStatus, TransactionId,
    transaction::{DeleteTransactionResponse, NewTransaction, Summary, Transaction},
};

/// The errors that may occur when talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL could not be parsed or cannot have path segments.
    #[error("invalid base URL \"{0}\"")]
    InvalidBaseUrl(String),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server responded with a non-success status code.
    #[error("{message} (status {status})")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The `error` field of the response body, or the status text if the body had none.
        message: String,
    },

    /// An action that needs a signed in user was attempted without one.
    #[error("no user is signed in")]
    MissingUserId,

    /// The create transaction form has an invalid value.
    #[error("{0}")]
    InvalidForm(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// A client for the transaction API.
///
/// Cloning is cheap, clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`, e.g. "http://localhost:5001/api".
    ///
    /// # Errors
    /// Returns [ClientError::InvalidBaseUrl] if `base_url` is not an absolute
    /// URL that can have a path, e.g. "mailto:someone@example.com".
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;

        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: url,
        })
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Check whether the server is running.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http.get(self.url(&["health"])?).send().await?;

        parse_response(response).await
    }

    /// Get all of `user_id`'s transactions, newest first.
    pub async fn get_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ClientError> {
        let response = self
            .http
            .get(self.url(&["transactions", user_id])?)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Get the balance, income and expenses of `user_id`.
    pub async fn get_summary(&self, user_id: &str) -> Result<Summary, ClientError> {
        let response = self
            .http
            .get(self.url(&["transactions", "summary", user_id])?)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Create a transaction and return it as it was stored.
    pub async fn create_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .post(self.url(&["transactions"])?)
            .json(new_transaction)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Delete a transaction and return its contents.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .delete(self.url(&["transactions", &id.to_string()])?)
            .send()
            .await?;

        parse_response::<DeleteTransactionResponse>(response)
            .await
            .map(|body| body.deleted_transaction)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}
