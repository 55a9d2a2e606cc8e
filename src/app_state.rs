//! Implements a struct that holds the state of the REST server.

use crate::pool::ConnectionPool;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connections shared by all requests.
    pub pool: ConnectionPool,
}

impl AppState {
    /// Create a new [AppState] around an open connection pool.
    ///
    /// The pool is expected to have initialized the database schema already,
    /// which [ConnectionPool::open] and [ConnectionPool::open_in_memory] do.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}
