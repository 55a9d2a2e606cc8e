//! Client-side derivations over the transaction list and category summary.

use time::Date;

use crate::transaction::{CategoryTotal, Transaction, TransactionType};

/// The label shown for summary rows without a category.
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// The income and expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
}

impl Totals {
    /// Sum the amounts of `transactions` by type.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut totals, transaction| {
                match transaction.kind {
                    TransactionType::Income => totals.income += transaction.amount,
                    TransactionType::Expense => totals.expense += transaction.amount,
                }

                totals
            })
    }

    /// Income minus expense.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// One slice of the category breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub label: String,
    /// The magnitude of the category's net total.
    pub value: f64,
}

/// Fold the category summary into labelled slices.
///
/// Rows with a missing or empty category are labelled [UNCATEGORIZED_LABEL]
/// and merged with any category literally named the same. Slices keep the
/// order in which their label first appears, and each value is the absolute
/// value of the folded sum.
pub fn category_breakdown(summary: &[CategoryTotal]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();

    for row in summary {
        let label = row
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL);

        match slices.iter_mut().find(|slice| slice.label == label) {
            Some(slice) => slice.value += row.total,
            None => slices.push(CategorySlice {
                label: label.to_owned(),
                value: row.total,
            }),
        }
    }

    for slice in &mut slices {
        slice.value = slice.value.abs();
    }

    slices
}

/// A single point on the transaction timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePoint {
    /// The transaction date, if it has one.
    pub date: Option<Date>,
    /// The transaction amount.
    pub amount: f64,
}

/// Turn the most-recent-first transaction list into chronological points.
pub fn timeline(transactions: &[Transaction]) -> Vec<TimelinePoint> {
    transactions
        .iter()
        .rev()
        .map(|transaction| TimelinePoint {
            date: transaction.txn_date,
            amount: transaction.amount,
        })
        .collect()
}
