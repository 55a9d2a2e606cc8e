//! The terminal dashboard: fetches the API state and renders it as text.
//!
//! Every view is rebuilt from a fresh fetch of both the transaction list and
//! the category summary. Mutations wait for the server and then re-fetch, so
//! nothing shown is ever computed from local edits.

mod aggregation;
mod format;

use std::fmt::{self, Display};

pub use aggregation::{
    CategorySlice, TimelinePoint, Totals, UNCATEGORIZED_LABEL, category_breakdown, timeline,
};
pub use format::{format_currency, format_date};

use crate::{
    client::{ApiClient, ClientError},
    database_id::TransactionId,
    transaction::{CategoryTotal, NewTransaction, Transaction, TransactionPatch},
};

/// Everything the dashboard shows, derived from one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// The transactions, most recent first.
    pub transactions: Vec<Transaction>,
    /// Income and expense totals over `transactions`.
    pub totals: Totals,
    /// The per-category breakdown of the summary.
    pub breakdown: Vec<CategorySlice>,
    /// The transactions in chronological order.
    pub timeline: Vec<TimelinePoint>,
}

impl Dashboard {
    /// Derive the dashboard from the transaction list and category summary.
    pub fn new(transactions: Vec<Transaction>, summary: &[CategoryTotal]) -> Self {
        Self {
            totals: Totals::from_transactions(&transactions),
            breakdown: category_breakdown(summary),
            timeline: timeline(&transactions),
            transactions,
        }
    }

    /// Fetch the transaction list and summary and derive the dashboard.
    ///
    /// # Errors
    /// Returns the first [ClientError] from either request.
    pub async fn fetch(client: &ApiClient) -> Result<Self, ClientError> {
        let (transactions, summary) =
            tokio::try_join!(client.list_transactions(), client.transaction_summary())?;

        Ok(Self::new(transactions, &summary))
    }

    /// A view of just the transaction list.
    pub fn transaction_table(&self) -> TransactionTable<'_> {
        TransactionTable(&self.transactions)
    }
}

/// Create a transaction, then re-fetch the dashboard.
///
/// # Errors
/// Returns a [ClientError] if the create or the re-fetch fails.
pub async fn add_transaction(
    client: &ApiClient,
    transaction: &NewTransaction,
) -> Result<Dashboard, ClientError> {
    let created = client.create_transaction(transaction).await?;
    tracing::debug!("Created transaction {}", created.id);

    Dashboard::fetch(client).await
}

/// Update a transaction, then re-fetch the dashboard.
///
/// # Errors
/// Returns a [ClientError] if the update or the re-fetch fails.
pub async fn edit_transaction(
    client: &ApiClient,
    id: TransactionId,
    patch: &TransactionPatch,
) -> Result<Dashboard, ClientError> {
    client.update_transaction(id, patch).await?;
    tracing::debug!("Updated transaction {id}");

    Dashboard::fetch(client).await
}

/// Delete a transaction, then re-fetch the dashboard.
///
/// # Errors
/// Returns a [ClientError] if the delete or the re-fetch fails.
pub async fn delete_transaction(
    client: &ApiClient,
    id: TransactionId,
) -> Result<Dashboard, ClientError> {
    client.delete_transaction(id).await?;
    tracing::debug!("Deleted transaction {id}");

    Dashboard::fetch(client).await
}

impl Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Income   {:>14}", format_currency(self.totals.income))?;
        writeln!(f, "Expense  {:>14}", format_currency(self.totals.expense))?;
        writeln!(f, "Balance  {:>14}", format_currency(self.totals.balance()))?;

        writeln!(f, "\nBy category")?;
        if self.breakdown.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for slice in &self.breakdown {
            writeln!(f, "  {:<20} {:>14}", slice.label, format_currency(slice.value))?;
        }

        writeln!(f, "\nTimeline")?;
        if self.timeline.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for point in &self.timeline {
            writeln!(
                f,
                "  {:<10} {:>14}",
                format_date(point.date),
                format_currency(point.amount)
            )?;
        }

        writeln!(f)?;
        write!(f, "{}", self.transaction_table())
    }
}

/// The transaction list rendered as a table.
#[derive(Debug, Clone, Copy)]
pub struct TransactionTable<'a>(&'a [Transaction]);

impl Display for TransactionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No transactions yet.");
        }

        writeln!(
            f,
            "{:>5}  {:<10}  {:<24}  {:<16}  {:<7}  {:>14}",
            "ID", "Date", "Title", "Category", "Type", "Amount"
        )?;

        for transaction in self.0 {
            writeln!(
                f,
                "{:>5}  {:<10}  {:<24}  {:<16}  {:<7}  {:>14}",
                transaction.id,
                format_date(transaction.txn_date),
                transaction.title,
                transaction.category.as_deref().unwrap_or("-"),
                transaction.kind,
                format_currency(transaction.amount),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dashboard::{Dashboard, add_transaction, delete_transaction, edit_transaction},
        test_utils::{must_count_transactions, spawn_test_server},
        transaction::{Transaction, TransactionPatch, TransactionType},
    };

    #[tokio::test]
    async fn fetch_of_empty_server_is_empty() {
        let (client, _) = spawn_test_server().await;

        let dashboard = Dashboard::fetch(&client).await.unwrap();

        assert!(dashboard.transactions.is_empty());
        assert!(dashboard.breakdown.is_empty());
        assert_eq!(dashboard.totals.balance(), 0.0);
        assert!(dashboard.to_string().contains("No transactions yet."));
    }

    #[tokio::test]
    async fn mutations_refresh_the_dashboard() {
        let (client, state) = spawn_test_server().await;

        let dashboard = add_transaction(
            &client,
            &Transaction::build("Salary", 3000.0, TransactionType::Income).category(Some("Work")),
        )
        .await
        .unwrap();
        assert_eq!(dashboard.totals.income, 3000.0);
        let id = dashboard.transactions[0].id;

        let dashboard = edit_transaction(
            &client,
            id,
            &TransactionPatch {
                kind: Some(TransactionType::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(dashboard.totals.income, 0.0);
        assert_eq!(dashboard.totals.expense, 3000.0);
        assert_eq!(dashboard.breakdown[0].value, 3000.0);

        let dashboard = delete_transaction(&client, id).await.unwrap();
        assert!(dashboard.transactions.is_empty());
        assert_eq!(must_count_transactions(&state).await, 0);
    }

    #[tokio::test]
    async fn failed_mutation_reports_error() {
        let (client, _) = spawn_test_server().await;

        let result = delete_transaction(&client, 999).await;

        assert!(result.is_err_and(|error| error.is_not_found()));
    }

    #[tokio::test]
    async fn rendering_shows_totals_and_other_label() {
        let (client, _) = spawn_test_server().await;
        add_transaction(
            &client,
            &Transaction::build("Coffee", 4.5, TransactionType::Expense),
        )
        .await
        .unwrap();

        let text = Dashboard::fetch(&client).await.unwrap().to_string();

        assert!(text.contains("Coffee"), "{text}");
        assert!(text.contains("Other"), "{text}");
        assert!(text.contains("-$4.50"), "{text}");
    }
}
