//! Budget performance tracking
//!
//! Compares a built budget against actual spending in an explicit
//! tracking window. The window is always passed in by the caller; the
//! tracker never reads the clock, so a given (budget, transactions,
//! window) triple always produces the same report.

use chrono::NaiveDate;

use crate::aggregate;
use crate::categories;
use crate::error::Result;
use crate::models::{
    Budget, BudgetPerformance, CategoryTotals, PerformanceRecord, PerformanceStatus, Transaction,
};

/// Percentage-used above which a category counts as consistently over budget
const OVERSPEND_PCT: f64 = 120.0;

/// Percentage-used below which a category has room to reallocate
const SLACK_PCT: f64 = 80.0;

/// Compare actual spending in `window` against the budget.
///
/// Every budgeted category gets a record even with zero actual spending.
/// Spending in categories without a budget line is surfaced separately in
/// `unbudgeted`, never silently merged into "other".
pub fn track_performance(
    budget: &Budget,
    actuals: &[Transaction],
    window: (NaiveDate, NaiveDate),
) -> Result<BudgetPerformance> {
    let mut actual_totals = aggregate::category_totals(actuals, Some(window))?;
    // Income entries are not spending against the budget
    actual_totals.retain(|category, _| !categories::is_income(category));

    let mut records = std::collections::HashMap::new();
    for (category, &budgeted) in &budget.category_budgets {
        let actual = actual_totals.get(category).copied().unwrap_or(0.0);
        records.insert(category.clone(), PerformanceRecord::new(budgeted, actual));
    }

    let unbudgeted_categories: CategoryTotals = actual_totals
        .into_iter()
        .filter(|(category, _)| !budget.category_budgets.contains_key(category))
        .collect();

    Ok(BudgetPerformance {
        records,
        unbudgeted_categories,
    })
}

/// Realistic budget changes suggested from observed behavior
pub fn suggest_adjustments(performance: &BudgetPerformance) -> Vec<String> {
    let mut suggestions = Vec::new();

    let mut over_budget: Vec<&str> = performance
        .records
        .iter()
        .filter(|(_, r)| r.status == PerformanceStatus::Over && r.percentage_used > OVERSPEND_PCT)
        .map(|(category, _)| category.as_str())
        .collect();
    over_budget.sort_unstable();

    if !over_budget.is_empty() {
        suggestions.push(format!(
            "You're consistently overspending on: {}",
            over_budget.join(", ")
        ));
        suggestions.push(
            "Consider increasing these budgets or finding specific ways to reduce spending"
                .to_string(),
        );
    }

    let mut under_budget: Vec<&str> = performance
        .records
        .iter()
        .filter(|(_, r)| {
            r.budgeted > 0.0
                && r.status == PerformanceStatus::Under
                && r.percentage_used < SLACK_PCT
        })
        .map(|(category, _)| category.as_str())
        .collect();
    under_budget.sort_unstable();

    if !under_budget.is_empty() {
        suggestions.push(format!("You have room in: {}", under_budget.join(", ")));
        suggestions
            .push("Consider reallocating this money to savings or debt payments".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetBuilder;
    use crate::models::Goals;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget() -> Budget {
        let history = vec![
            Transaction::new(date(2024, 1, 15), 1200.0, "rent"),
            Transaction::new(date(2024, 1, 16), 300.0, "groceries"),
            Transaction::new(date(2024, 1, 18), 50.0, "dining_out"),
            Transaction::new(date(2024, 2, 15), 1200.0, "rent"),
            Transaction::new(date(2024, 2, 16), 300.0, "groceries"),
            Transaction::new(date(2024, 2, 18), 50.0, "dining_out"),
        ];
        BudgetBuilder::new()
            .build(5000.0, &history, &Goals::new(), date(2024, 3, 1))
            .unwrap()
    }

    fn march() -> (NaiveDate, NaiveDate) {
        (date(2024, 3, 1), date(2024, 3, 31))
    }

    #[test]
    fn test_under_budget_record() {
        let actuals = vec![
            Transaction::new(date(2024, 3, 5), 280.0, "groceries"),
            Transaction::new(date(2024, 3, 10), 1200.0, "rent"),
        ];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();

        let groceries = &performance.records["groceries"];
        assert_eq!(groceries.status, PerformanceStatus::Under);
        assert!((groceries.percentage_used - 93.333).abs() < 0.01);
        assert!((groceries.difference - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_budgeted_category_gets_a_record() {
        let actuals = vec![Transaction::new(date(2024, 3, 10), 1200.0, "rent")];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();

        // dining_out saw no spending this window but still reports
        let dining = &performance.records["dining_out"];
        assert_eq!(dining.actual, 0.0);
        assert_eq!(dining.status, PerformanceStatus::Under);
        assert_eq!(performance.records.len(), 3);
    }

    #[test]
    fn test_unbudgeted_categories_surfaced_separately() {
        let actuals = vec![
            Transaction::new(date(2024, 3, 10), 1200.0, "rent"),
            Transaction::new(date(2024, 3, 12), 90.0, "pet_supplies"),
        ];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();

        assert!(!performance.records.contains_key("pet_supplies"));
        assert_eq!(performance.unbudgeted_categories["pet_supplies"], 90.0);
    }

    #[test]
    fn test_window_is_explicit() {
        // Spending outside the tracking window is ignored
        let actuals = vec![
            Transaction::new(date(2024, 2, 28), 500.0, "groceries"),
            Transaction::new(date(2024, 3, 5), 100.0, "groceries"),
        ];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();
        assert_eq!(performance.records["groceries"].actual, 100.0);
    }

    #[test]
    fn test_suggest_adjustments() {
        let actuals = vec![
            // groceries at 150% of its 300 budget
            Transaction::new(date(2024, 3, 5), 450.0, "groceries"),
            // dining_out at 20% of its 50 budget
            Transaction::new(date(2024, 3, 7), 10.0, "dining_out"),
            Transaction::new(date(2024, 3, 10), 1200.0, "rent"),
        ];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();
        let suggestions = suggest_adjustments(&performance);

        assert!(suggestions
            .iter()
            .any(|s| s.contains("overspending on: groceries")));
        assert!(suggestions.iter().any(|s| s.contains("room in: dining_out")));
    }

    #[test]
    fn test_no_suggestions_when_on_track() {
        let actuals = vec![
            Transaction::new(date(2024, 3, 5), 300.0, "groceries"),
            Transaction::new(date(2024, 3, 7), 45.0, "dining_out"),
            Transaction::new(date(2024, 3, 10), 1200.0, "rent"),
        ];
        let performance = track_performance(&budget(), &actuals, march()).unwrap();
        assert!(suggest_adjustments(&performance).is_empty());
    }
}
