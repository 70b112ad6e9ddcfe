//! Steward Core Library
//!
//! Budget derivation and affordability evaluation for the Steward
//! personal finance advisor:
//! - Transaction aggregation by category and calendar month
//! - Spending pattern analysis (trends, irregular expenses, income stability)
//! - Realistic budget construction from observed behavior
//! - Budget performance tracking against an explicit window
//! - Affordability decisions (trips, purchases, subscriptions, housing, career moves)
//! - Goal timeline calculation
//! - Heuristic spending insights
//! - Pluggable narrative enrichment backends (OpenAI-compatible, mock)

pub mod aggregate;
pub mod analyze;
pub mod budget;
pub mod categories;
pub mod decision;
pub mod error;
pub mod goals;
pub mod insights;
pub mod models;
pub mod narrative;
pub mod performance;

/// Test utilities including the mock narrative server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analyze::{PatternAnalyzer, Timeframe};
pub use budget::BudgetBuilder;
pub use decision::{DecisionEngine, DecisionPolicy};
pub use error::{Error, Result};
pub use insights::InsightGenerator;
pub use models::{
    AffordabilityVerdict, AlternativePlan, Budget, BudgetPerformance, BudgetStatus,
    CategoryTotals, DecisionType, ExpenseForecast, GoalTimeline, Goals, HousingChoice,
    ImpactAnalysis, IncomeStability, Insight, IrregularExpense, MonthlyAverage,
    PerformanceRecord, PerformanceStatus, RecurringCharge, Severity, SpendingStats, Transaction,
    Trend,
};
pub use narrative::{
    DecisionSummary, MockBackend, NarrativeBackend, NarrativeClient, OpenAICompatibleBackend,
};
pub use performance::{suggest_adjustments, track_performance};
