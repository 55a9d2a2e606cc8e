use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Deserializer};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::{JsonBody, PathParam},
    pool::ConnectionPool,
    transaction::{Transaction, TransactionPatch, get_transaction, parse_date, update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connections for managing transactions.
    pub pool: ConnectionPool,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }
}

/// The JSON body for editing a transaction, before validation.
///
/// The outer `Option` records whether the field was present in the body,
/// the inner one whether it was `null`.
#[derive(Debug, Default, Deserialize)]
pub struct EditTransactionBody {
    #[serde(default, deserialize_with = "present")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    amount: Option<Option<f64>>,
    #[serde(rename = "type", default, deserialize_with = "present")]
    kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    txn_date: Option<Option<String>>,
}

/// Marks a field as present, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn required<T>(field: Option<Option<T>>, name: &str) -> Result<Option<T>, Error> {
    match field {
        Some(None) => Err(Error::Validation(format!("{name} cannot be null"))),
        Some(Some(value)) => Ok(Some(value)),
        None => Ok(None),
    }
}

impl EditTransactionBody {
    /// Convert the body into a patch of the fields that were present.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if no fields are present, a required
    /// field is `null`, or a field cannot be parsed.
    pub fn validate(self) -> Result<TransactionPatch, Error> {
        let kind = match required(self.kind, "type")? {
            Some(kind) => Some(kind.parse()?),
            None => None,
        };
        let txn_date = match self.txn_date {
            Some(Some(text)) if !text.is_empty() => Some(Some(parse_date(&text)?)),
            Some(_) => Some(None),
            None => None,
        };

        let patch = TransactionPatch {
            title: required(self.title, "title")?,
            amount: required(self.amount, "amount")?,
            kind,
            category: self.category,
            txn_date,
        };

        if patch.is_empty() {
            Err(Error::Validation("No fields to update".to_owned()))
        } else {
            Ok(patch)
        }
    }
}

/// A route handler for updating some or all fields of a transaction.
///
/// Responds with the transaction as read back from the database after the
/// update, or 404 if it does not exist.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    PathParam(transaction_id): PathParam<TransactionId>,
    JsonBody(body): JsonBody<EditTransactionBody>,
) -> Result<Json<Transaction>, Error> {
    let patch = body.validate()?;

    let connection = state.pool.get().await?;

    // The update and the read are separate statements. A zero row update is
    // reported by the read.
    let rows_affected = update_transaction(transaction_id, &patch, &connection)?;
    tracing::debug!("Update of transaction {transaction_id} affected {rows_affected} rows");

    get_transaction(transaction_id, &connection).map(Json)
}


#[cfg(test)]
mod endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        error::ErrorBody,
        test_utils::{must_create_test_server, must_insert_transaction},
        transaction::{Transaction, TransactionType},
    };

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (server, state) = must_create_test_server();
        let stored = must_insert_transaction(
            &state,
            Transaction::build("X", 5.0, TransactionType::Expense)
                .category(Some("Food"))
                .txn_date(Some(date!(2025 - 01 - 10))),
        )
        .await;

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, stored.id))
            .json(&json!({"amount": 9}))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Transaction>(),
            Transaction {
                amount: 9.0,
                ..stored
            }
        );
    }

    #[tokio::test]
    async fn explicit_null_clears_category() {
        let (server, state) = must_create_test_server();
        let stored = must_insert_transaction(
            &state,
            Transaction::build("X", 5.0, TransactionType::Expense).category(Some("Food")),
        )
        .await;

        let updated = server
            .put(&format_endpoint(endpoints::TRANSACTION, stored.id))
            .json(&json!({"category": null}))
            .await
            .json::<Transaction>();

        assert_eq!(updated.category, None);
        assert_eq!(updated.title, "X");
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let (server, state) = must_create_test_server();
        let stored = must_insert_transaction(
            &state,
            Transaction::build("X", 5.0, TransactionType::Expense),
        )
        .await;

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, stored.id))
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>(),
            ErrorBody {
                error: "No fields to update".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (server, _) = must_create_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 42))
            .json(&json!({"title": "foo"}))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<ErrorBody>().error, "Not found");
    }
}
