use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::UserId,
    extract::JsonBody,
    pool::ConnectionPool,
    transaction::{
        DEFAULT_USER_ID, NewTransaction, Transaction, TransactionType, create_transaction,
        parse_date,
    },
};

const MISSING_REQUIRED_FIELDS: &str = "title, amount and type are required";

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connections for managing transactions.
    pub pool: ConnectionPool,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }
}

/// The JSON body for creating a transaction, before validation.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTransactionBody {
    /// Defaults to [DEFAULT_USER_ID].
    pub user_id: Option<UserId>,
    /// Required and must not be empty.
    pub title: Option<String>,
    /// Required.
    pub amount: Option<f64>,
    /// Required, either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// An empty string is treated as no category.
    pub category: Option<String>,
    /// A date in the format "YYYY-MM-DD". An empty string is treated as no date.
    pub txn_date: Option<String>,
}

impl CreateTransactionBody {
    /// Check the required fields and parse the typed ones.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if a required field is missing or
    /// a field cannot be parsed.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let (title, amount, kind) = match (self.title, self.amount, self.kind) {
            (Some(title), Some(amount), Some(kind)) if !title.is_empty() && !kind.is_empty() => {
                (title, amount, kind)
            }
            _ => return Err(Error::Validation(MISSING_REQUIRED_FIELDS.to_owned())),
        };

        let kind: TransactionType = kind.parse()?;
        let txn_date = match self.txn_date.as_deref() {
            None | Some("") => None,
            Some(text) => Some(parse_date(text)?),
        };
        let category = self.category.filter(|category| !category.is_empty());

        Ok(Transaction::build(&title, amount, kind)
            .user_id(self.user_id.unwrap_or(DEFAULT_USER_ID))
            .category(category.as_deref())
            .txn_date(txn_date))
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction, as read back from the
/// database after the insert.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    JsonBody(body): JsonBody<CreateTransactionBody>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = body.validate()?;

    let connection = state.pool.get().await?;
    let transaction = create_transaction(&new_transaction, &connection)?;

    tracing::debug!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod validation_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{Transaction, TransactionType, create_endpoint::CreateTransactionBody},
    };

    fn valid_body() -> CreateTransactionBody {
        CreateTransactionBody {
            title: Some("Groceries".to_owned()),
            amount: Some(54.2),
            kind: Some("expense".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn applies_defaults() {
        let got = valid_body().validate().unwrap();

        assert_eq!(
            got,
            Transaction::build("Groceries", 54.2, TransactionType::Expense)
        );
        assert_eq!(got.user_id, 1);
    }

    #[test]
    fn parses_optional_fields() {
        let body = CreateTransactionBody {
            user_id: Some(7),
            category: Some("Food".to_owned()),
            txn_date: Some("2025-02-03".to_owned()),
            ..valid_body()
        };

        let got = body.validate().unwrap();

        assert_eq!(got.user_id, 7);
        assert_eq!(got.category.as_deref(), Some("Food"));
        assert_eq!(got.txn_date, Some(date!(2025 - 02 - 03)));
    }

    #[test]
    fn empty_optional_strings_become_none() {
        let body = CreateTransactionBody {
            category: Some(String::new()),
            txn_date: Some(String::new()),
            ..valid_body()
        };

        let got = body.validate().unwrap();

        assert_eq!(got.category, None);
        assert_eq!(got.txn_date, None);
    }

    #[test]
    fn missing_or_empty_required_fields_are_rejected() {
        let bodies = [
            CreateTransactionBody {
                title: None,
                ..valid_body()
            },
            CreateTransactionBody {
                title: Some(String::new()),
                ..valid_body()
            },
            CreateTransactionBody {
                amount: None,
                ..valid_body()
            },
            CreateTransactionBody {
                kind: None,
                ..valid_body()
            },
            CreateTransactionBody {
                kind: Some(String::new()),
                ..valid_body()
            },
        ];

        for body in bodies {
            let result = body.validate();

            assert!(
                matches!(&result, Err(Error::Validation(message)) if message == "title, amount and type are required"),
                "want missing field error, got {result:?}"
            );
        }
    }

    #[test]
    fn zero_amount_is_accepted() {
        let body = CreateTransactionBody {
            amount: Some(0.0),
            ..valid_body()
        };

        assert!(body.validate().is_ok());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let body = CreateTransactionBody {
            kind: Some("transfer".to_owned()),
            ..valid_body()
        };

        assert!(matches!(body.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let body = CreateTransactionBody {
            txn_date: Some("2025-02-30".to_owned()),
            ..valid_body()
        };

        assert!(matches!(body.validate(), Err(Error::Validation(_))));
    }
}
