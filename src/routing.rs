//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    AppState, Error, endpoints,
    error::ErrorBody,
    logging::logging_middleware,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint, transaction_summary_endpoint,
    },
};

/// The text served from the root route while the server is up.
pub const HEALTH_TEXT: &str = "Finance Tracker API is running...";

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_SUMMARY,
            get(transaction_summary_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_405_method_not_allowed)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Report that the server is alive.
async fn get_health() -> &'static str {
    HEALTH_TEXT
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

async fn get_405_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "Method not allowed".to_owned(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod root_route_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{routing::HEALTH_TEXT, test_utils::must_create_test_server};

    #[tokio::test]
    async fn root_reports_liveness() {
        let (server, _) = must_create_test_server();

        let response = server.get("/").await;

        response.assert_status_ok();
        response.assert_text(HEALTH_TEXT);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let (server, _) = must_create_test_server();

        let response = server.get("/api/budgets").await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn unsupported_method_is_json_method_not_allowed() {
        let (server, _) = must_create_test_server();

        for response in [
            server.put("/api/transactions/summary").await,
            server.delete("/api/transactions").await,
            server.post("/api/transactions/5").await,
        ] {
            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            response.assert_json(&json!({"error": "Method not allowed"}));
        }
    }

    #[tokio::test]
    async fn store_failure_is_generic_server_error() {
        let (server, state) = must_create_test_server();
        state.pool.close();

        let response = server.get("/api/transactions").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({"error": "DB error"}));
    }
}
