#![allow(missing_docs)]

use axum_test::TestServer;

use crate::{
    AppState, ConnectionPool, build_router,
    client::ApiClient,
    pool::DEFAULT_POOL_SIZE,
    transaction::{NewTransaction, Transaction, count_transactions, create_transaction},
};

#[track_caller]
pub(crate) fn must_create_test_state() -> AppState {
    let pool =
        ConnectionPool::open_in_memory(DEFAULT_POOL_SIZE).expect("Could not open test database");

    AppState::new(pool)
}

#[track_caller]
pub(crate) fn must_create_test_server() -> (TestServer, AppState) {
    let state = must_create_test_state();
    let server = TestServer::try_new(build_router(state.clone())).expect("Could not create test server");

    (server, state)
}

/// Serve the app on a random local port and return a client pointed at it.
///
/// The server runs until the test's runtime shuts down.
pub(crate) async fn spawn_test_server() -> (ApiClient, AppState) {
    let state = must_create_test_state();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind test listener");
    let addr = listener
        .local_addr()
        .expect("Could not get test listener address");
    let router = build_router(state.clone());

    tokio::spawn(async move { axum::serve(listener, router).await });

    (ApiClient::new(&format!("http://{addr}")), state)
}

pub(crate) async fn must_insert_transaction(
    state: &AppState,
    transaction: NewTransaction,
) -> Transaction {
    let connection = state
        .pool
        .get()
        .await
        .expect("Could not get test connection");

    create_transaction(&transaction, &connection).expect("Could not create test transaction")
}

pub(crate) async fn must_count_transactions(state: &AppState) -> u32 {
    let connection = state
        .pool
        .get()
        .await
        .expect("Could not get test connection");

    count_transactions(&connection).expect("Could not count test transactions")
}
