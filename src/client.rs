//! An HTTP client for the transactions API.
//!
//! Each method maps to exactly one request. Nothing is cached or retried.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    error::ErrorBody,
    transaction::{CategoryTotal, DeleteResponse, NewTransaction, Transaction, TransactionPatch},
};

/// The errors that may occur when talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("could not reach the server: {0}")]
    Http(#[from] reqwest::Error),

    /// The server responded with a non-2xx status.
    #[error("the server responded with {status}: {message}")]
    Api {
        /// The response status.
        status: StatusCode,
        /// The `error` field of the response body.
        message: String,
    },
}

impl ClientError {
    /// Whether the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// A client for the transactions API at a fixed base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url`, e.g. "http://localhost:4000".
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Get every transaction, most recent first.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        let response = self
            .http
            .get(self.url(endpoints::TRANSACTIONS_API))
            .send()
            .await?;

        parse_response(response).await
    }

    /// Get the net total of each category.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error.
    pub async fn transaction_summary(&self) -> Result<Vec<CategoryTotal>, ClientError> {
        let response = self
            .http
            .get(self.url(endpoints::TRANSACTION_SUMMARY))
            .send()
            .await?;

        parse_response(response).await
    }

    /// Get a single transaction.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error, including when the transaction does not exist.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .get(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
            .send()
            .await?;

        parse_response(response).await
    }

    /// Create a transaction and return it as stored by the server.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error.
    pub async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .post(self.url(endpoints::TRANSACTIONS_API))
            .json(transaction)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Update the fields set in `patch` and return the updated transaction.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .put(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
            .json(patch)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Delete a transaction.
    ///
    /// # Errors
    /// Returns a [ClientError] if the request fails or the server responds
    /// with an error.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
            .send()
            .await?;

        parse_response::<DeleteResponse>(response).await.map(|_| ())
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };

    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use time::macros::date;

    use crate::{
        client::ClientError,
        test_utils::spawn_test_server,
        transaction::{Transaction, TransactionPatch, TransactionType},
    };

    #[tokio::test]
    async fn create_get_update_delete_round_trip() {
        let (client, _) = spawn_test_server().await;

        let created = client
            .create_transaction(
                &Transaction::build("Rent", 950.0, TransactionType::Expense)
                    .category(Some("Housing"))
                    .txn_date(Some(date!(2025 - 04 - 01))),
            )
            .await
            .expect("could not create transaction");
        assert_eq!(
            client.get_transaction(created.id).await.unwrap(),
            created
        );

        let updated = client
            .update_transaction(
                created.id,
                &TransactionPatch {
                    amount: Some(1000.0),
                    txn_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .expect("could not update transaction");
        assert_eq!(
            updated,
            Transaction {
                amount: 1000.0,
                txn_date: None,
                ..created.clone()
            }
        );

        client
            .delete_transaction(created.id)
            .await
            .expect("could not delete transaction");
        let result = client.get_transaction(created.id).await;
        assert!(
            result.as_ref().is_err_and(ClientError::is_not_found),
            "want not found, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_and_summary_reflect_server_state() {
        let (client, _) = spawn_test_server().await;
        for (title, amount, kind) in [
            ("pay", 100.0, TransactionType::Income),
            ("spend", 40.0, TransactionType::Expense),
        ] {
            client
                .create_transaction(&Transaction::build(title, amount, kind).category(Some("A")))
                .await
                .unwrap();
        }

        let transactions = client.list_transactions().await.unwrap();
        let summary = client.transaction_summary().await.unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total, 60.0);
    }

    #[tokio::test]
    async fn server_errors_carry_the_error_message() {
        let (client, _) = spawn_test_server().await;

        let result = client
            .update_transaction(42, &TransactionPatch::default())
            .await;

        match result {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "No fields to update");
            }
            other => panic!("want API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleting_missing_transaction_is_not_found() {
        let (client, _) = spawn_test_server().await;

        let result = client.delete_transaction(42).await;

        assert!(result.is_err_and(|error| error.is_not_found()));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = crate::client::ApiClient::new("http://127.0.0.1:9");

        let result = client.list_transactions().await;

        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
