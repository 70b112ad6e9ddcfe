//! Spending pattern analysis
//!
//! Derives per-category trends, irregular expenses and income stability
//! from raw transaction history, and projects future expenses from the
//! same aggregates. The lookback window is anchored at the latest
//! transaction date, never the system clock, so results are a pure
//! function of the supplied history.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::aggregate;
use crate::categories;
use crate::error::{Error, Result};
use crate::models::{
    ExpenseForecast, IncomeStability, IrregularExpense, SpendingStats, Transaction, Trend,
};

/// Timeline arithmetic uses 30-day months throughout the crate
pub(crate) const DAYS_PER_MONTH: i64 = 30;

/// Lookback window for pattern analysis, e.g. "3months"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeframe {
    pub months: u32,
}

impl Timeframe {
    pub const fn months(months: u32) -> Self {
        Self { months }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self { months: 3 }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}months", self.months)
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "");
        let digits = normalized
            .trim_end_matches("months")
            .trim_end_matches("month")
            .trim_end_matches("mo")
            .trim_end_matches('m');
        let months: u32 = digits
            .parse()
            .map_err(|_| format!("Unknown timeframe: {}", s))?;
        if months == 0 {
            return Err(format!("Timeframe must cover at least one month: {}", s));
        }
        Ok(Self { months })
    }
}

/// Analyzer for spending patterns over a lookback window
///
/// All thresholds are configuration, not hard contracts.
pub struct PatternAnalyzer {
    /// Relative change between window halves before a trend is called (default 10%)
    trend_threshold: f64,
    /// Multiple of a category's monthly average that makes a transaction irregular (default 2x)
    irregular_multiplier: f64,
    /// Smallest amount ever reported as irregular (default $100)
    min_irregular_amount: f64,
    /// Coefficient of variation below which income counts as stable (default 10%)
    income_cv_threshold: f64,
    /// Coefficient of variation below which a category counts as recurring (default 25%)
    recurring_cv_threshold: f64,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self {
            trend_threshold: 0.10,
            irregular_multiplier: 2.0,
            min_irregular_amount: 100.0,
            income_cv_threshold: 0.10,
            recurring_cv_threshold: 0.25,
        }
    }

    pub fn with_thresholds(
        trend_threshold: f64,
        irregular_multiplier: f64,
        min_irregular_amount: f64,
        income_cv_threshold: f64,
        recurring_cv_threshold: f64,
    ) -> Self {
        Self {
            trend_threshold,
            irregular_multiplier,
            min_irregular_amount,
            income_cv_threshold,
            recurring_cv_threshold,
        }
    }

    /// Analyze spending patterns over the trailing `timeframe`.
    ///
    /// Fails with `InsufficientData` when fewer than two distinct calendar
    /// months fall inside the window; trend and stability analysis are
    /// undefined on a single month of data.
    pub fn analyze(
        &self,
        transactions: &[Transaction],
        timeframe: Timeframe,
    ) -> Result<SpendingStats> {
        let latest = transactions.iter().map(|tx| tx.date).max().ok_or_else(|| {
            Error::insufficient_data("transactions", "no transaction history supplied")
        })?;
        let lookback_start = latest - Duration::days(DAYS_PER_MONTH * i64::from(timeframe.months));
        let window = Some((lookback_start, latest));

        let filtered = aggregate::in_window(transactions, window)?;
        let months = aggregate::distinct_months(&filtered);
        if months < 2 {
            return Err(Error::insufficient_data(
                "transactions",
                format!(
                    "trend analysis requires at least two distinct months, found {}",
                    months
                ),
            ));
        }

        let categories_avg = aggregate::monthly_averages(transactions, window)?;
        let monthly_avg = categories_avg.values().sum();

        let by_month = monthly_totals_by_category(&filtered);
        let window_months: HashSet<(i32, u32)> = filtered
            .iter()
            .map(|tx| (tx.date.year(), tx.date.month()))
            .collect();

        let trends = self.classify_trends(&filtered, latest);
        let irregular_expenses =
            self.irregular_expenses(&filtered, &categories_avg, &by_month, &window_months);
        let income_stability = self.income_stability(&by_month, &window_months);

        debug!(
            categories = categories_avg.len(),
            months,
            irregular = irregular_expenses.len(),
            "Spending pattern analysis complete"
        );

        Ok(SpendingStats {
            monthly_avg,
            categories: categories_avg,
            irregular_expenses,
            trends,
            income_stability,
        })
    }

    /// Split the observed span into two halves by time and compare them.
    ///
    /// The halves span equal time, so their totals compare directly.
    fn classify_trends(
        &self,
        filtered: &[&Transaction],
        latest: NaiveDate,
    ) -> HashMap<String, Trend> {
        let span_start = filtered
            .iter()
            .map(|tx| tx.date)
            .min()
            .unwrap_or(latest);
        let midpoint = span_start + (latest - span_start) / 2;

        struct Halves {
            earlier_sum: f64,
            earlier_count: usize,
            later_sum: f64,
            later_count: usize,
        }

        let mut halves: HashMap<String, Halves> = HashMap::new();
        for tx in filtered {
            let entry = halves
                .entry(tx.resolved_category().to_string())
                .or_insert(Halves {
                    earlier_sum: 0.0,
                    earlier_count: 0,
                    later_sum: 0.0,
                    later_count: 0,
                });
            if tx.date < midpoint {
                entry.earlier_sum += tx.amount;
                entry.earlier_count += 1;
            } else {
                entry.later_sum += tx.amount;
                entry.later_count += 1;
            }
        }

        halves
            .into_iter()
            .map(|(category, h)| {
                let trend = if h.earlier_count == 0 || h.later_count == 0 {
                    // Present in only one half; don't guess
                    Trend::InsufficientData
                } else if h.earlier_sum <= f64::EPSILON {
                    Trend::InsufficientData
                } else {
                    let change = (h.later_sum - h.earlier_sum) / h.earlier_sum;
                    if change > self.trend_threshold {
                        Trend::Increasing
                    } else if change < -self.trend_threshold {
                        Trend::Decreasing
                    } else {
                        Trend::Stable
                    }
                };
                (category, trend)
            })
            .collect()
    }

    /// Large transactions outside established category norms.
    ///
    /// Recurring categories are the recognized essentials plus any category
    /// whose month-to-month totals have low variance. Income entries are
    /// not expenses and are never flagged.
    fn irregular_expenses(
        &self,
        filtered: &[&Transaction],
        averages: &HashMap<String, f64>,
        by_month: &HashMap<String, HashMap<(i32, u32), f64>>,
        window_months: &HashSet<(i32, u32)>,
    ) -> Vec<IrregularExpense> {
        let mut irregular = Vec::new();
        for tx in filtered {
            let category = tx.resolved_category();
            if categories::is_income(category) {
                continue;
            }
            if self.is_recurring(category, by_month, window_months) {
                continue;
            }
            if tx.amount < self.min_irregular_amount {
                continue;
            }

            let months_present = by_month.get(category).map_or(0, HashMap::len);
            let established = months_present >= 2;
            let average = averages.get(category).copied().unwrap_or(0.0);

            if !established || tx.amount > self.irregular_multiplier * average {
                irregular.push(IrregularExpense {
                    category: category.to_string(),
                    amount: tx.amount,
                    date: tx.date,
                    description: tx.description.clone(),
                });
            }
        }
        irregular.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        irregular
    }

    fn is_recurring(
        &self,
        category: &str,
        by_month: &HashMap<String, HashMap<(i32, u32), f64>>,
        window_months: &HashSet<(i32, u32)>,
    ) -> bool {
        if categories::is_essential(category) {
            return true;
        }
        let Some(month_totals) = by_month.get(category) else {
            return false;
        };
        if month_totals.len() < 2 {
            return false;
        }
        let values = zero_filled(month_totals, window_months);
        matches!(
            coefficient_of_variation(&values),
            Some(cv) if cv < self.recurring_cv_threshold
        )
    }

    /// Stability of recorded income across the window's months.
    ///
    /// Months without any income entry count as zero, so a skipped paycheck
    /// reads as variable income rather than being averaged away.
    fn income_stability(
        &self,
        by_month: &HashMap<String, HashMap<(i32, u32), f64>>,
        window_months: &HashSet<(i32, u32)>,
    ) -> IncomeStability {
        let Some(income_months) = by_month.get(categories::INCOME) else {
            return IncomeStability::Unknown;
        };
        if income_months.len() < 2 {
            return IncomeStability::Unknown;
        }
        let values = zero_filled(income_months, window_months);
        match coefficient_of_variation(&values) {
            Some(cv) if cv < self.income_cv_threshold => IncomeStability::Stable,
            Some(_) => IncomeStability::Variable,
            None => IncomeStability::Unknown,
        }
    }

    /// Project per-category spending for upcoming months.
    ///
    /// Projections start from observed monthly averages, nudged by the
    /// trend classification: an increasing category is projected at its
    /// average plus the trend threshold, a decreasing one below it.
    pub fn forecast_expenses(
        &self,
        transactions: &[Transaction],
        timeframe: Timeframe,
        months_ahead: u32,
    ) -> Result<ExpenseForecast> {
        if months_ahead == 0 {
            return Err(Error::invalid_input(
                "months_ahead",
                "forecast must cover at least one month",
            ));
        }
        let stats = self.analyze(transactions, timeframe)?;

        let mut monthly = HashMap::new();
        for (category, average) in &stats.categories {
            if categories::is_income(category) {
                continue;
            }
            let projected = match stats.trends.get(category) {
                Some(Trend::Increasing) => average * (1.0 + self.trend_threshold),
                Some(Trend::Decreasing) => average * (1.0 - self.trend_threshold),
                _ => *average,
            };
            monthly.insert(category.clone(), projected);
        }

        let total_monthly: f64 = monthly.values().sum();
        Ok(ExpenseForecast {
            months_ahead,
            monthly,
            total_monthly,
            total_projected: total_monthly * f64::from(months_ahead),
        })
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-category totals bucketed by (year, month)
fn monthly_totals_by_category(
    filtered: &[&Transaction],
) -> HashMap<String, HashMap<(i32, u32), f64>> {
    let mut by_month: HashMap<String, HashMap<(i32, u32), f64>> = HashMap::new();
    for tx in filtered {
        *by_month
            .entry(tx.resolved_category().to_string())
            .or_default()
            .entry((tx.date.year(), tx.date.month()))
            .or_insert(0.0) += tx.amount;
    }
    by_month
}

/// Monthly totals with zeros for the window months a category skipped
fn zero_filled(
    month_totals: &HashMap<(i32, u32), f64>,
    window_months: &HashSet<(i32, u32)>,
) -> Vec<f64> {
    window_months
        .iter()
        .map(|month| month_totals.get(month).copied().unwrap_or(0.0))
        .collect()
}

/// Population coefficient of variation; None when the mean is zero
fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= f64::EPSILON {
        return None;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt() / mean)
}
