//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Identifier of the user a transaction was recorded for.
///
/// Users are not modelled by the app, so this does not refer to any table.
pub type UserId = DatabaseId;
