//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    database_id::{TransactionId, UserId},
};

/// The user ID assigned to transactions created without one.
pub const DEFAULT_USER_ID: UserId = 1;

/// The wire and storage format for transaction dates, e.g. "2025-01-15".
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parse a date in the format "YYYY-MM-DD".
///
/// # Errors
/// Returns an [Error::Validation] if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT).map_err(|_| {
        Error::Validation(format!(
            "\"{text}\" is not a valid date, use the format YYYY-MM-DD"
        ))
    })
}

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::Validation(
                "type must be either \"income\" or \"expense\"".to_owned(),
            )),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database.
    pub id: TransactionId,
    /// The user the transaction was recorded for.
    pub user_id: UserId,
    /// A short description of what the transaction was for.
    pub title: String,
    /// The amount of money spent or earned, stored exactly as given.
    ///
    /// Whether the money was spent or earned is given by `kind`, not the sign.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free text category, e.g. "Groceries".
    pub category: Option<String>,
    /// When the transaction happened.
    #[serde(default, with = "iso_date::option")]
    pub txn_date: Option<Date>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(title: &str, amount: f64, kind: TransactionType) -> NewTransaction {
        NewTransaction {
            user_id: DEFAULT_USER_ID,
            title: title.to_owned(),
            amount,
            kind,
            category: None,
            txn_date: None,
        }
    }
}

/// A validated transaction that has not been stored yet.
///
/// Optional fields default to `None` and the user ID to [DEFAULT_USER_ID].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    /// The user the transaction is recorded for.
    pub user_id: UserId,
    /// A short, non-empty description.
    pub title: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free text category.
    pub category: Option<String>,
    /// When the transaction happened.
    #[serde(with = "iso_date::option")]
    pub txn_date: Option<Date>,
}

impl NewTransaction {
    /// Set the category for the transaction.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_owned);
        self
    }

    /// Set the date of the transaction.
    pub fn txn_date(mut self, txn_date: Option<Date>) -> Self {
        self.txn_date = txn_date;
        self
    }

    /// Set the user the transaction is recorded for.
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }
}

/// A partial update to a stored transaction.
///
/// `None` leaves a field unchanged. For the nullable fields, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionPatch {
    /// The new title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The new amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// The new transaction type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    /// The new category, `Some(None)` to clear it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    /// The new date, `Some(None)` to clear it.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date_patch"
    )]
    pub txn_date: Option<Option<Date>>,
}

impl TransactionPatch {
    /// Whether the patch would leave every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.txn_date.is_none()
    }
}

fn serialize_date_patch<S>(value: &Option<Option<Date>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    iso_date::option::serialize(&value.flatten(), serializer)
}

/// The net amount for one category, income minus expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name, `None` for transactions without a category.
    pub category: Option<String>,
    /// The signed sum of the category's transactions.
    pub total: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

type RowsAffected = usize;

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, amount, type, category, txn_date \
                              FROM transactions";

/// Insert a new transaction and return its database assigned ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn insert_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    connection.execute(
        "INSERT INTO transactions (user_id, title, amount, type, category, txn_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            transaction.user_id,
            &transaction.title,
            transaction.amount,
            transaction.kind,
            &transaction.category,
            transaction.txn_date,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Insert a new transaction, then read it back from the database.
///
/// The insert and the read are separate statements. A concurrent delete in
/// between surfaces as [Error::NotFound].
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the new row was deleted before it could be read,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let id = insert_transaction(transaction, connection)?;

    get_transaction(id, connection)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction, most recent first.
///
/// Transactions are ordered by date, newest first, with ties broken by the
/// most recently created. Transactions without a date come last.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY txn_date DESC, id DESC"))?
        .query_map([], map_transaction_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Apply `patch` to the transaction `id`, returning the number of rows changed.
///
/// Only the fields set in `patch` are written. Zero rows changed means no
/// transaction has the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `patch` does not change any fields,
/// - or [Error::SqlError] if there is some SQL error.
pub fn update_transaction(
    id: TransactionId,
    patch: &TransactionPatch,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();

    if let Some(title) = &patch.title {
        assignments.push("title = :title");
        params.push((":title", title));
    }
    if let Some(amount) = &patch.amount {
        assignments.push("amount = :amount");
        params.push((":amount", amount));
    }
    if let Some(kind) = &patch.kind {
        assignments.push("type = :type");
        params.push((":type", kind));
    }
    if let Some(category) = &patch.category {
        assignments.push("category = :category");
        params.push((":category", category));
    }
    if let Some(txn_date) = &patch.txn_date {
        assignments.push("txn_date = :txn_date");
        params.push((":txn_date", txn_date));
    }

    if assignments.is_empty() {
        return Err(Error::Validation("No fields to update".to_owned()));
    }

    params.push((":id", &id));

    connection
        .execute(
            &format!(
                "UPDATE transactions SET {} WHERE id = :id",
                assignments.join(", ")
            ),
            params.as_slice(),
        )
        .map_err(Error::from)
}

/// Delete the transaction `id`, returning the number of rows deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// Sum transactions per category, counting income as positive and expenses
/// as negative.
///
/// Transactions without a category are grouped under `None`. The order of
/// the groups is not specified.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn summarize_by_category(connection: &Connection) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category,
                    SUM(CASE WHEN type = 'expense' THEN -amount ELSE amount END) AS total
             FROM transactions
             GROUP BY category",
        )?
        .query_map([], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
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
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT stops IDs of deleted rows from being reused.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL DEFAULT 1,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT,
                txn_date TEXT
                )",
        (),
    )?;

    // Index used by the list endpoint.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date_id ON transactions(txn_date, id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let kind = row.get(4)?;
    let category = row.get(5)?;
    let txn_date = row.get(6)?;

    Ok(Transaction {
        id,
        user_id,
        title,
        amount,
        kind,
        category,
        txn_date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
