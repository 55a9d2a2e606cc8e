//! Route paths shared by the router and the HTTP client.
//!
//! Paths with a `{transaction_id}` segment are filled in with [format_endpoint].

/// The root route which reports that the server is alive.
pub const ROOT: &str = "/";
/// The route to list and create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the per-category totals of all transactions.
pub const TRANSACTION_SUMMARY: &str = "/api/transactions/summary";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Substitute `id` for the first `{...}` segment of `endpoint_path`.
///
/// Paths without a segment are returned unchanged. An unterminated segment
/// swallows the rest of the path.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
