//! Fintrack is a small personal finance tracker.
//!
//! This library provides a JSON REST API over a single table of income and
//! expense transactions, plus an HTTP client and the aggregations used by the
//! terminal dashboard.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod database_id;
mod db;
pub mod endpoints;
pub mod error;
mod extract;
mod logging;
pub mod pool;
mod routing;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::ServerConfig;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pool::ConnectionPool;
pub use routing::{HEALTH_TEXT, build_router};

/// Wait for Ctrl+C or SIGTERM, then tell the server behind `handle` to stop
/// accepting connections and finish in-flight requests within one second.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
