use axum::{
    Json,
    extract::{FromRef, State},
};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::PathParam,
    pool::ConnectionPool,
    transaction::{Transaction, get_transaction},
};

/// The state needed to get a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    /// The database connections for reading transactions.
    pub pool: ConnectionPool,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }
}

/// A route handler for getting a transaction by its database ID.
///
/// Responds with 404 if no transaction has the requested ID.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.pool.get().await?;

    get_transaction(transaction_id, &connection).map(Json)
}
