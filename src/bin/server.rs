use std::process::ExitCode;

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    AppState, ConnectionPool, ServerConfig, build_router, graceful_shutdown,
    pool::DEFAULT_POOL_SIZE,
};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config = ServerConfig::parse();
    tracing::debug!("Loaded configuration: {config:?}");

    let db_path = config.database_path();
    tracing::info!(
        "Opening database {} as user {}",
        db_path.display(),
        config.db_user
    );

    let pool = match ConnectionPool::open(&db_path, DEFAULT_POOL_SIZE) {
        Ok(pool) => pool,
        Err(error) => {
            tracing::error!("Could not open database {}: {error}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(AppState::new(pool.clone())));
    let addr = config.socket_addr();

    tracing::info!("HTTP server listening on {addr}");
    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    pool.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("Server error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are already logged where they are converted to responses.
        .on_failure(());

    router.layer(tracing_layer)
}
