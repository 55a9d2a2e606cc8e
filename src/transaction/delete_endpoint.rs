use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, database_id::TransactionId, extract::PathParam, pool::ConnectionPool,
    transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connections for managing transactions.
    pub pool: ConnectionPool,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }
}

/// The response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`, failures are reported with an error body instead.
    pub success: bool,
}

/// A route handler for deleting a transaction.
///
/// Responds with 404 if the transaction does not exist.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Json<DeleteResponse>, Error> {
    let connection = state.pool.get().await?;

    match delete_transaction(transaction_id, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(DeleteResponse { success: true })),
    }
}
