use axum::{
    Json,
    extract::{FromRef, State},
};

use crate::{
    AppState, Error,
    pool::ConnectionPool,
    transaction::{CategoryTotal, Transaction, list_transactions, summarize_by_category},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connections for reading transactions.
    pub pool: ConnectionPool,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }
}

/// A route handler that responds with every transaction, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.pool.get().await?;

    list_transactions(&connection).map(Json)
}

/// A route handler that responds with the net total of each category.
///
/// Transactions without a category are reported under a `null` category.
pub async fn transaction_summary_endpoint(
    State(state): State<ListTransactionsState>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let connection = state.pool.get().await?;

    summarize_by_category(&connection).map(Json)
}
