//! Budget construction
//!
//! Builds a realistic monthly budget from actual spending behavior rather
//! than idealistic percentages: essentials get their observed averages,
//! savings comes out of what's genuinely left over.

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate;
use crate::categories;
use crate::error::{Error, Result};
use crate::goals;
use crate::models::{Budget, BudgetStatus, Goals, Transaction};

/// Builder holding the savings policy
pub struct BudgetBuilder {
    /// Fraction of discretionary income earmarked for savings (default 30%)
    savings_rate: f64,
}

impl BudgetBuilder {
    pub fn new() -> Self {
        Self { savings_rate: 0.30 }
    }

    pub fn with_savings_rate(savings_rate: f64) -> Self {
        Self { savings_rate }
    }

    /// Build a budget from salary, spending history and goals.
    ///
    /// `as_of` anchors goal target dates so the result is deterministic.
    /// Fails with `InvalidInput` on non-positive salary or goal targets and
    /// with `InsufficientData` when the history has no observed months.
    pub fn build(
        &self,
        salary: f64,
        history: &[Transaction],
        goals: &Goals,
        as_of: NaiveDate,
    ) -> Result<Budget> {
        if salary <= 0.0 {
            return Err(Error::invalid_input(
                "salary",
                format!("must be positive, got {}", salary),
            ));
        }
        for (name, &target) in goals {
            if target <= 0.0 {
                return Err(Error::invalid_input(
                    "goals",
                    format!("goal '{}' target must be positive, got {}", name, target),
                ));
            }
        }

        let mut category_budgets = aggregate::monthly_averages(history, None)?;
        // Income entries are not spending; they get no budget line
        category_budgets.retain(|category, _| !categories::is_income(category));

        let essential_expenses: f64 = category_budgets
            .iter()
            .filter(|(category, _)| categories::is_essential(category))
            .map(|(_, avg)| avg)
            .sum();

        let discretionary_total = salary - essential_expenses;
        let (status, discretionary_budget, savings_target) = if discretionary_total < 0.0 {
            // Never propagate a negative budget downstream; surface the
            // shortfall as a status instead
            (
                BudgetStatus::Shortfall {
                    amount: -discretionary_total,
                },
                0.0,
                0.0,
            )
        } else {
            let savings_target = (discretionary_total * self.savings_rate).max(0.0);
            (
                BudgetStatus::Funded,
                discretionary_total - savings_target,
                savings_target,
            )
        };

        let goals_timeline = goals::timelines(goals, savings_target, as_of);

        debug!(
            essential = essential_expenses,
            discretionary = discretionary_budget,
            savings = savings_target,
            shortfall = status.is_shortfall(),
            "Budget built"
        );

        Ok(Budget {
            monthly_salary: salary,
            essential_expenses,
            discretionary_budget,
            savings_target,
            category_budgets,
            goals_timeline,
            status,
        })
    }
}

impl Default for BudgetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoalTimeline;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn history() -> Vec<Transaction> {
        vec![
            Transaction::new(date(2024, 1, 15), 1200.0, "rent"),
            Transaction::new(date(2024, 1, 16), 300.0, "groceries"),
            Transaction::new(date(2024, 1, 18), 45.0, "dining_out"),
            Transaction::new(date(2024, 2, 15), 1200.0, "rent"),
            Transaction::new(date(2024, 2, 16), 280.0, "groceries"),
            Transaction::new(date(2024, 2, 22), 120.0, "utilities"),
        ]
    }

    fn goals() -> Goals {
        let mut goals = Goals::new();
        goals.insert("vacation".to_string(), 3000.0);
        goals
    }

    #[test]
    fn test_budget_invariant() {
        let budget = BudgetBuilder::new()
            .build(5000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();

        // rent 1200 + groceries 290 + utilities 60
        assert!((budget.essential_expenses - 1550.0).abs() < 1e-9);
        assert_eq!(budget.status, BudgetStatus::Funded);
        assert!(
            (budget.essential_expenses + budget.discretionary_budget + budget.savings_target
                - budget.monthly_salary)
                .abs()
                < 1e-9
        );
        // 30% of the 3450 discretionary total
        assert!((budget.savings_target - 1035.0).abs() < 1e-9);
        assert!((budget.discretionary_budget - 2415.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_budgets_default_to_observed_averages() {
        let budget = BudgetBuilder::new()
            .build(5000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();

        assert_eq!(budget.category_budgets["rent"], 1200.0);
        assert_eq!(budget.category_budgets["groceries"], 290.0);
        // Categories with zero history get no budget line
        assert!(!budget.category_budgets.contains_key("entertainment"));
    }

    #[test]
    fn test_shortfall_clamps_to_zero() {
        let budget = BudgetBuilder::new()
            .build(1000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();

        assert_eq!(
            budget.status,
            BudgetStatus::Shortfall { amount: 550.0 }
        );
        assert_eq!(budget.discretionary_budget, 0.0);
        assert_eq!(budget.savings_target, 0.0);
        // No savings capacity means every goal is blocked
        assert!(budget.goals_timeline.values().all(GoalTimeline::is_blocked));
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = BudgetBuilder::new();
        let a = builder
            .build(5000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();
        let b = builder
            .build(5000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[test]
    fn test_goal_timeline_populated() {
        let budget = BudgetBuilder::new()
            .build(5000.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap();

        match &budget.goals_timeline["vacation"] {
            GoalTimeline::Projected {
                monthly_savings_needed,
                months_to_goal,
                ..
            } => {
                assert!((monthly_savings_needed - 1035.0).abs() < 1e-9);
                // 3000 / 1035 = 2.898... rounds to 2.9
                assert_eq!(*months_to_goal, 2.9);
            }
            GoalTimeline::Blocked { .. } => panic!("expected projected timeline"),
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let err = BudgetBuilder::new()
            .build(0.0, &history(), &goals(), date(2024, 3, 1))
            .unwrap_err();
        assert_eq!(err.field(), Some("salary"));

        let mut bad_goals = Goals::new();
        bad_goals.insert("car".to_string(), -100.0);
        let err = BudgetBuilder::new()
            .build(5000.0, &history(), &bad_goals, date(2024, 3, 1))
            .unwrap_err();
        assert_eq!(err.field(), Some("goals"));
    }

    #[test]
    fn test_income_gets_no_budget_line() {
        let mut with_income = history();
        with_income.push(Transaction::new(date(2024, 1, 1), 5000.0, "income"));
        with_income.push(Transaction::new(date(2024, 2, 1), 5000.0, "income"));

        let budget = BudgetBuilder::new()
            .build(5000.0, &with_income, &goals(), date(2024, 3, 1))
            .unwrap();
        assert!(!budget.category_budgets.contains_key("income"));
    }
}
