//! Goal timeline calculation
//!
//! Pure functions from savings capacity and named goals to
//! months-to-target and target dates. No side effects, no clock reads;
//! callers pass the date timelines are projected from.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::analyze::DAYS_PER_MONTH;
use crate::models::{GoalTimeline, Goals};

/// Timeline for every named goal at the given monthly savings capacity
pub fn timelines(
    goals: &Goals,
    savings_capacity: f64,
    from: NaiveDate,
) -> HashMap<String, GoalTimeline> {
    goals
        .iter()
        .map(|(name, &target_amount)| {
            (
                name.clone(),
                timeline_for(target_amount, savings_capacity, from),
            )
        })
        .collect()
}

/// Timeline for a single goal
///
/// Zero or negative capacity yields the blocked shape; the projected
/// shape is never partially filled.
pub fn timeline_for(target_amount: f64, savings_capacity: f64, from: NaiveDate) -> GoalTimeline {
    if savings_capacity <= 0.0 {
        return GoalTimeline::Blocked { target_amount };
    }

    let months_needed = target_amount / savings_capacity;
    let target_date = from + Duration::days((months_needed * DAYS_PER_MONTH as f64).round() as i64);

    GoalTimeline::Projected {
        target_amount,
        monthly_savings_needed: savings_capacity,
        months_to_goal: (months_needed * 10.0).round() / 10.0,
        target_date: target_date.format("%Y-%m").to_string(),
    }
}
