//! Domain models for Steward

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::categories;

/// A recorded financial transaction
///
/// Immutable once recorded. Amounts are non-negative; whether an entry is
/// income or spending is carried by its category. Ordering of a transaction
/// slice is irrelevant to every consumer in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, category: &str) -> Self {
        Self {
            date,
            amount,
            category: Some(category.to_string()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The category bucket this transaction aggregates under
    pub fn resolved_category(&self) -> &str {
        categories::resolve(self.category.as_deref())
    }
}

/// Accumulated amount per category over a window
pub type CategoryTotals = HashMap<String, f64>;

/// Per-category total divided by distinct months observed
pub type MonthlyAverage = HashMap<String, f64>;

/// Goal name mapped to its target amount
pub type Goals = HashMap<String, f64>;

/// Trend direction for a category's spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    /// Category present in only one half of the lookback window
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "increasing" => Ok(Trend::Increasing),
            "decreasing" => Ok(Trend::Decreasing),
            "stable" => Ok(Trend::Stable),
            "insufficient_data" => Ok(Trend::InsufficientData),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

/// Stability of recorded income across months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStability {
    Stable,
    Variable,
    /// Fewer than two months of income entries in the window
    Unknown,
}

impl IncomeStability {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeStability::Stable => "stable",
            IncomeStability::Variable => "variable",
            IncomeStability::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IncomeStability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A large, non-recurring transaction outside established category norms
///
/// Reported individually, never aggregated away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrregularExpense {
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// Output of the spending pattern analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingStats {
    /// Average monthly spending across all categories in the window
    pub monthly_avg: f64,
    /// Monthly average per category; values sum to `monthly_avg`
    pub categories: MonthlyAverage,
    pub irregular_expenses: Vec<IrregularExpense>,
    pub trends: HashMap<String, Trend>,
    pub income_stability: IncomeStability,
}

/// Funding state of a built budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Salary covers essential expenses
    Funded,
    /// Essentials exceed salary by `amount`; discretionary and savings
    /// are clamped to zero rather than going negative
    Shortfall { amount: f64 },
}

impl BudgetStatus {
    pub fn is_shortfall(&self) -> bool {
        matches!(self, BudgetStatus::Shortfall { .. })
    }
}

/// A realistic monthly budget derived from observed behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub monthly_salary: f64,
    pub essential_expenses: f64,
    pub discretionary_budget: f64,
    pub savings_target: f64,
    /// Observed monthly average per spending category present in history
    pub category_budgets: MonthlyAverage,
    pub goals_timeline: HashMap<String, GoalTimeline>,
    pub status: BudgetStatus,
}

impl Budget {
    /// True leftover money after essential expenses
    pub fn disposable_income(&self) -> f64 {
        self.monthly_salary - self.essential_expenses
    }
}

/// Whether spending in a category ran over or under its budget line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Over,
    Under,
}

impl PerformanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::Over => "over",
            PerformanceStatus::Under => "under",
        }
    }
}

impl std::fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget-vs-actual comparison for one category
///
/// Recomputed wholesale whenever the tracked window changes; never
/// mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub budgeted: f64,
    pub actual: f64,
    /// budgeted - actual
    pub difference: f64,
    /// actual / budgeted * 100; 0 when budgeted is 0
    pub percentage_used: f64,
    /// Over strictly when actual > budgeted; equality counts as under
    pub status: PerformanceStatus,
}

impl PerformanceRecord {
    pub fn new(budgeted: f64, actual: f64) -> Self {
        let percentage_used = if budgeted > 0.0 {
            actual / budgeted * 100.0
        } else {
            0.0
        };
        let status = if actual > budgeted {
            PerformanceStatus::Over
        } else {
            PerformanceStatus::Under
        };
        Self {
            budgeted,
            actual,
            difference: budgeted - actual,
            percentage_used,
            status,
        }
    }
}

/// Budget performance for a tracking window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPerformance {
    /// One record per budgeted category, even when actual spending is zero
    pub records: HashMap<String, PerformanceRecord>,
    /// Spending in categories with no budget line, surfaced separately
    /// rather than merged into "other"
    pub unbudgeted_categories: CategoryTotals,
}

/// Timeline for a single savings goal
///
/// Either fully projected or blocked; the two shapes never mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalTimeline {
    Projected {
        target_amount: f64,
        monthly_savings_needed: f64,
        /// target_amount / savings capacity, rounded to one decimal
        months_to_goal: f64,
        /// Year-month the goal is reached, e.g. "2027-03"
        target_date: String,
    },
    /// No savings capacity to allocate
    Blocked { target_amount: f64 },
}

impl GoalTimeline {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GoalTimeline::Blocked { .. })
    }
}

/// An existing recurring subscription line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringCharge {
    pub name: String,
    pub monthly_cost: f64,
}

impl RecurringCharge {
    pub fn new(name: &str, monthly_cost: f64) -> Self {
        Self {
            name: name.to_string(),
            monthly_cost,
        }
    }
}

/// The kind of affordability decision being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Trip,
    Purchase,
    Subscription,
    RentVsBuy,
    CareerMove,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Trip => "trip",
            DecisionType::Purchase => "purchase",
            DecisionType::Subscription => "subscription",
            DecisionType::RentVsBuy => "rent_vs_buy",
            DecisionType::CareerMove => "career_move",
        }
    }
}

impl std::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recommended option in a rent-vs-buy comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HousingChoice {
    Rent,
    Buy,
}

impl HousingChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            HousingChoice::Rent => "rent",
            HousingChoice::Buy => "buy",
        }
    }
}

impl std::fmt::Display for HousingChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The concrete numbers behind a verdict, so callers can verify the
/// arithmetic independent of any narrative text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ImpactAnalysis {
    Trip {
        cost: f64,
        monthly_salary: f64,
        /// Dollar ceiling from the salary-fraction policy
        salary_fraction_limit: f64,
        current_savings: f64,
        /// cost times the savings safety multiplier
        required_savings: f64,
        within_salary_fraction: bool,
        savings_sufficient: bool,
    },
    Purchase {
        cost: f64,
        monthly_salary: f64,
        salary_fraction_limit: f64,
        within_salary_fraction: bool,
    },
    Subscription {
        monthly_cost: f64,
        existing_monthly_total: f64,
        new_monthly_total: f64,
        /// Dollar cap from the subscription salary-fraction policy
        budget_cap: f64,
        within_cap: bool,
    },
    RentVsBuy {
        monthly_rent: f64,
        purchase_price: f64,
        down_payment: f64,
        required_down_payment: f64,
        down_payment_adequate: bool,
        /// Amortized monthly cost of buying at the assumed rate and term
        monthly_buy_cost: f64,
        recommendation: HousingChoice,
    },
    CareerMove {
        new_salary: f64,
        cost_of_living_delta: f64,
        current_disposable: f64,
        new_disposable: f64,
        disposable_delta: f64,
        requires_confirmation: bool,
    },
}

/// A recommended save-up plan attached to declined verdicts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativePlan {
    pub monthly_savings_needed: f64,
    pub horizon_months: u32,
    pub summary: String,
}

/// Result of an affordability decision
///
/// Produced fresh per query; never cached, since it depends on live
/// salary/savings/spending state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityVerdict {
    pub affordable: bool,
    /// Narrative explanation; a templated fallback when the narrative
    /// service is absent or failing
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_plan: Option<AlternativePlan>,
    pub impact_analysis: ImpactAnalysis,
}

/// Projected per-category spending for upcoming months
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseForecast {
    pub months_ahead: u32,
    /// Projected monthly spend per category
    pub monthly: MonthlyAverage,
    pub total_monthly: f64,
    pub total_projected: f64,
}

/// How urgent/important an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Attention,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Warning => "warning",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Attention => 2,
            Severity::Warning => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A heuristic finding surfaced from spending stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub title: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_trend_round_trip() {
        assert_eq!(Trend::Increasing.as_str(), "increasing");
        assert_eq!(
            Trend::from_str("insufficient_data").unwrap(),
            Trend::InsufficientData
        );
        assert!(Trend::from_str("sideways").is_err());
    }

    #[test]
    fn test_performance_record_zero_budget_guard() {
        let record = PerformanceRecord::new(0.0, 50.0);
        assert_eq!(record.percentage_used, 0.0);
        assert_eq!(record.status, PerformanceStatus::Over);

        let record = PerformanceRecord::new(300.0, 280.0);
        assert_eq!(record.status, PerformanceStatus::Under);
        assert!((record.percentage_used - 93.333).abs() < 0.01);
        assert!((record.difference - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_performance_equality_counts_as_under() {
        let record = PerformanceRecord::new(100.0, 100.0);
        assert_eq!(record.status, PerformanceStatus::Under);
    }

    #[test]
    fn test_goal_timeline_shapes_never_mix() {
        let blocked = GoalTimeline::Blocked {
            target_amount: 3000.0,
        };
        assert!(blocked.is_blocked());

        let json = serde_json::to_value(&blocked).unwrap();
        assert_eq!(json["status"], "blocked");
        assert!(json.get("months_to_goal").is_none());
    }

    #[test]
    fn test_severity_priority() {
        assert!(Severity::Warning.priority() > Severity::Attention.priority());
        assert!(Severity::Attention.priority() > Severity::Info.priority());
    }

    #[test]
    fn test_transaction_resolved_category() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let tx = Transaction::new(date, 45.0, "dining_out");
        assert_eq!(tx.resolved_category(), "dining_out");

        let uncategorized = Transaction {
            date,
            amount: 12.0,
            category: None,
            description: None,
        };
        assert_eq!(uncategorized.resolved_category(), "other");
    }
}
