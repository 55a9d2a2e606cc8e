//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Everything that can go wrong while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was missing a required field or contained a malformed one.
    ///
    /// The message is returned to the client as is, so it must not contain
    /// any details about the server internals.
    #[error("{0}")]
    Validation(String),

    /// No transaction has the requested ID, or no route matched.
    ///
    /// Queries that return no rows are converted to this variant.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Any other SQLite failure.
    ///
    /// Logged on the server and reported to the client as "DB error".
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The connection pool has been closed.
    #[error("the connection pool has been closed")]
    PoolClosed,

    /// No connection could be checked out of the pool.
    #[error("could not get a database connection: {0}")]
    Pool(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl From<r2d2::Error> for Error {
    fn from(error: r2d2::Error) -> Self {
        Error::Pool(error.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameters: {}", rejection.body_text());
        Error::Validation("invalid transaction id".to_owned())
    }
}

/// The body sent to the client for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// A short, client safe description of what went wrong.
    pub error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
        })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(message)).into_response()
            }
            Error::NotFound => (StatusCode::NOT_FOUND, ErrorBody::new("Not found")).into_response(),
            // Store errors are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("DB error")).into_response()
            }
        }
    }
}
