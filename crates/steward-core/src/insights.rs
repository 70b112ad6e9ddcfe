//! Heuristic spending insights
//!
//! Surfaces what's interesting or actionable in a spending profile
//! without waiting for the user to ask the right question. Everything
//! here is a cheap heuristic over already-computed stats; the heavy
//! lifting happened in the analyzer.

use crate::categories;
use crate::models::{Insight, Severity, SpendingStats};

/// Category the dining heuristic watches
const DINING_OUT: &str = "dining_out";

/// Generator holding the insight thresholds
pub struct InsightGenerator {
    /// Monthly dining-out spend worth calling out (default $200)
    dining_out_floor: f64,
    /// Discretionary share of monthly spending worth warning about (default 30%)
    discretionary_share: f64,
}

impl InsightGenerator {
    pub fn new() -> Self {
        Self {
            dining_out_floor: 200.0,
            discretionary_share: 0.30,
        }
    }

    pub fn with_thresholds(dining_out_floor: f64, discretionary_share: f64) -> Self {
        Self {
            dining_out_floor,
            discretionary_share,
        }
    }

    /// Generate insights from spending stats, most urgent first
    pub fn generate(&self, stats: &SpendingStats) -> Vec<Insight> {
        let mut insights = Vec::new();

        // Biggest expense category (income entries aren't expenses)
        let top = stats
            .categories
            .iter()
            .filter(|(category, _)| !categories::is_income(category))
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((category, amount)) = top {
            insights.push(Insight {
                severity: Severity::Info,
                title: "Biggest Expense Category".to_string(),
                summary: format!("Your biggest expense category is {}: ${:.0}/mo", category, amount),
            });
        }

        if let Some(&dining) = stats.categories.get(DINING_OUT) {
            if dining > self.dining_out_floor {
                insights.push(Insight {
                    severity: Severity::Attention,
                    title: "Dining Out".to_string(),
                    summary: format!(
                        "You spend ${:.0}/month on dining out - cooking more could save $100+",
                        dining
                    ),
                });
            }
        }

        let discretionary: f64 = stats
            .categories
            .iter()
            .filter(|(category, _)| {
                !categories::is_essential(category) && !categories::is_income(category)
            })
            .map(|(_, amount)| amount)
            .sum();
        if stats.monthly_avg > 0.0 && discretionary > stats.monthly_avg * self.discretionary_share
        {
            insights.push(Insight {
                severity: Severity::Warning,
                title: "Discretionary Spending".to_string(),
                summary: format!(
                    "Discretionary spending is ${:.0}/mo - reducing it by 20% would boost savings",
                    discretionary
                ),
            });
        }

        // Most urgent first
        insights.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
        insights
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeStability;
    use std::collections::HashMap;

    fn stats(categories: &[(&str, f64)]) -> SpendingStats {
        let categories: HashMap<String, f64> = categories
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect();
        SpendingStats {
            monthly_avg: categories.values().sum(),
            categories,
            irregular_expenses: vec![],
            trends: HashMap::new(),
            income_stability: IncomeStability::Unknown,
        }
    }

    #[test]
    fn test_top_category_insight() {
        let insights = InsightGenerator::new().generate(&stats(&[
            ("rent", 1200.0),
            ("groceries", 300.0),
        ]));

        assert!(insights
            .iter()
            .any(|i| i.summary.contains("rent") && i.summary.contains("$1200")));
    }

    #[test]
    fn test_dining_out_callout() {
        let insights = InsightGenerator::new().generate(&stats(&[
            ("rent", 1200.0),
            ("dining_out", 350.0),
        ]));

        let dining = insights
            .iter()
            .find(|i| i.title == "Dining Out")
            .expect("expected dining insight");
        assert_eq!(dining.severity, Severity::Attention);
        assert!(dining.summary.contains("$350"));
    }

    #[test]
    fn test_quiet_profile_stays_quiet() {
        let insights = InsightGenerator::new().generate(&stats(&[
            ("rent", 1200.0),
            ("groceries", 300.0),
            ("dining_out", 50.0),
        ]));

        // Only the top-category info line; nothing to warn about
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Info);
    }

    #[test]
    fn test_discretionary_warning_sorts_first() {
        let insights = InsightGenerator::new().generate(&stats(&[
            ("rent", 1000.0),
            ("entertainment", 400.0),
            ("hobbies", 300.0),
        ]));

        assert_eq!(insights[0].severity, Severity::Warning);
        assert!(insights[0].summary.contains("$700"));
    }

    #[test]
    fn test_income_excluded_from_top_category() {
        let insights = InsightGenerator::new().generate(&stats(&[
            ("income", 5000.0),
            ("rent", 1200.0),
        ]));

        assert!(insights
            .iter()
            .all(|i| !i.summary.contains("income")));
    }
}
