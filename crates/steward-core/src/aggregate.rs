//! Transaction aggregation
//!
//! Groups raw transactions by category and by calendar month. Everything
//! here is a pure function of its inputs; pattern analysis, budgeting and
//! performance tracking are all built on these aggregates.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{CategoryTotals, MonthlyAverage, Transaction};

/// Inclusive date window; `None` means all supplied transactions
pub type Window = Option<(NaiveDate, NaiveDate)>;

/// Filter transactions to a window, validating amounts on the way.
///
/// Transactions are immutable records; a negative amount means the record
/// was malformed upstream, not that money flowed the other way.
pub fn in_window(transactions: &[Transaction], window: Window) -> Result<Vec<&Transaction>> {
    let mut filtered = Vec::new();
    for tx in transactions {
        if tx.amount < 0.0 {
            return Err(Error::invalid_input(
                "amount",
                format!("negative amount {} on {}", tx.amount, tx.date),
            ));
        }
        let keep = match window {
            Some((start, end)) => tx.date >= start && tx.date <= end,
            None => true,
        };
        if keep {
            filtered.push(tx);
        }
    }
    Ok(filtered)
}

/// Number of unique (year, month) pairs present
pub fn distinct_months(transactions: &[&Transaction]) -> usize {
    transactions
        .iter()
        .map(|tx| (tx.date.year(), tx.date.month()))
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of amounts per category over the window
///
/// Transactions without a category are bucketed under the reserved
/// "other" category, never dropped.
pub fn category_totals(transactions: &[Transaction], window: Window) -> Result<CategoryTotals> {
    let filtered = in_window(transactions, window)?;
    let mut totals = CategoryTotals::new();
    for tx in filtered {
        *totals.entry(tx.resolved_category().to_string()).or_insert(0.0) += tx.amount;
    }
    Ok(totals)
}

/// Per-category monthly average: total divided by distinct months observed
///
/// Dividing by distinct months rather than a fixed window length guards
/// against inflating averages when history is sparse. An empty window has
/// zero months and fails with `InsufficientData` instead of dividing.
pub fn monthly_averages(transactions: &[Transaction], window: Window) -> Result<MonthlyAverage> {
    let filtered = in_window(transactions, window)?;
    let months = distinct_months(&filtered);
    if months == 0 {
        return Err(Error::insufficient_data(
            "transactions",
            "no transactions in the requested window",
        ));
    }

    let mut totals = MonthlyAverage::new();
    for tx in &filtered {
        *totals.entry(tx.resolved_category().to_string()).or_insert(0.0) += tx.amount;
    }
    for total in totals.values_mut() {
        *total /= months as f64;
    }
    Ok(totals)
}
