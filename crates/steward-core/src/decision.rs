//! Affordability decision engine
//!
//! Evaluates one-off financial decisions against salary, savings and the
//! current budget. Every verdict is pure arithmetic over the supplied
//! figures; the optional narrative backend only enriches the reasoning
//! text and can never change, delay or block a verdict.

use serde_json::json;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{
    AffordabilityVerdict, AlternativePlan, Budget, DecisionType, HousingChoice, ImpactAnalysis,
    RecurringCharge,
};
use crate::narrative::{DecisionSummary, NarrativeBackend, NarrativeClient};

/// Thresholds for affordability decisions
///
/// These are illustrative defaults, not financial law; callers tune them
/// per user.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    /// Trip cost must stay under this fraction of monthly salary (default 30%)
    pub trip_salary_fraction: f64,
    /// Purchase cost must stay under this fraction of monthly salary (default 25%)
    pub purchase_salary_fraction: f64,
    /// Savings must cover this multiple of a trip's cost (default 2x)
    pub trip_savings_multiplier: f64,
    /// Horizon for save-up alternative plans, in months (default 6)
    pub plan_horizon_months: u32,
    /// Recurring subscriptions may consume this fraction of salary (default 5%)
    pub subscription_salary_fraction: f64,
    /// Minimum down payment as a fraction of purchase price (default 10%)
    pub min_down_payment_fraction: f64,
    /// Assumed annual mortgage rate (default 6.5%)
    pub mortgage_rate: f64,
    /// Assumed mortgage term in years (default 30)
    pub mortgage_term_years: u32,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            trip_salary_fraction: 0.30,
            purchase_salary_fraction: 0.25,
            trip_savings_multiplier: 2.0,
            plan_horizon_months: 6,
            subscription_salary_fraction: 0.05,
            min_down_payment_fraction: 0.10,
            mortgage_rate: 0.065,
            mortgage_term_years: 30,
        }
    }
}

/// The affordability decision engine
///
/// Stateless between queries: each call recomputes its verdict from the
/// supplied inputs and nothing is cached.
pub struct DecisionEngine {
    policy: DecisionPolicy,
    narrative: Option<NarrativeClient>,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self {
            policy: DecisionPolicy::default(),
            narrative: None,
        }
    }

    pub fn with_policy(policy: DecisionPolicy) -> Self {
        Self {
            policy,
            narrative: None,
        }
    }

    /// Attach a narrative backend for enriched reasoning text
    pub fn with_narrative(mut self, narrative: NarrativeClient) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Can the user afford a trip?
    ///
    /// Affordable when the cost stays under the salary-fraction ceiling AND
    /// current savings cover the safety multiple of the cost. Trips deplete
    /// savings, so they face both tests.
    pub async fn afford_trip(
        &self,
        trip_cost: f64,
        monthly_salary: f64,
        current_savings: f64,
    ) -> Result<AffordabilityVerdict> {
        validate_salary(monthly_salary)?;
        validate_cost("trip_cost", trip_cost)?;

        let salary_fraction_limit = self.policy.trip_salary_fraction * monthly_salary;
        let required_savings = trip_cost * self.policy.trip_savings_multiplier;
        let within_salary_fraction = trip_cost < salary_fraction_limit;
        let savings_sufficient = current_savings > required_savings;
        let affordable = within_salary_fraction && savings_sufficient;

        let fallback = if affordable {
            format!(
                "A ${:.2} trip stays under the ${:.2} salary-fraction ceiling and your \
                 ${:.2} savings cover the ${:.2} safety margin.",
                trip_cost, salary_fraction_limit, current_savings, required_savings
            )
        } else {
            let mut reasons = Vec::new();
            if !within_salary_fraction {
                reasons.push(format!(
                    "${:.2} is at or above the ${:.2} ceiling ({:.0}% of your ${:.2} salary)",
                    trip_cost,
                    salary_fraction_limit,
                    self.policy.trip_salary_fraction * 100.0,
                    monthly_salary
                ));
            }
            if !savings_sufficient {
                reasons.push(format!(
                    "savings of ${:.2} don't cover the ${:.2} safety margin",
                    current_savings, required_savings
                ));
            }
            format!("Declined: {}.", reasons.join("; "))
        };

        let alternative_plan = (!affordable).then(|| self.save_up_plan(trip_cost));
        let summary = DecisionSummary::new(
            DecisionType::Trip,
            affordable,
            json!({
                "cost": trip_cost,
                "monthly_salary": monthly_salary,
                "current_savings": current_savings,
                "salary_fraction_limit": salary_fraction_limit,
                "required_savings": required_savings,
            }),
        );
        let reasoning = self.narrate(summary, fallback).await;

        Ok(AffordabilityVerdict {
            affordable,
            reasoning,
            alternative_plan,
            impact_analysis: ImpactAnalysis::Trip {
                cost: trip_cost,
                monthly_salary,
                salary_fraction_limit,
                current_savings,
                required_savings,
                within_salary_fraction,
                savings_sufficient,
            },
        })
    }

    /// Can the user afford a one-off purchase?
    ///
    /// Purchases only face the salary-fraction test; unlike trips they
    /// don't gate on a savings multiple.
    pub async fn afford_purchase(
        &self,
        cost: f64,
        monthly_salary: f64,
    ) -> Result<AffordabilityVerdict> {
        validate_salary(monthly_salary)?;
        validate_cost("cost", cost)?;

        let salary_fraction_limit = self.policy.purchase_salary_fraction * monthly_salary;
        let within_salary_fraction = cost < salary_fraction_limit;
        let affordable = within_salary_fraction;

        let fallback = if affordable {
            format!(
                "A ${:.2} purchase stays under {:.0}% of your ${:.2} monthly salary (${:.2}).",
                cost,
                self.policy.purchase_salary_fraction * 100.0,
                monthly_salary,
                salary_fraction_limit
            )
        } else {
            format!(
                "Declined: ${:.2} is at or above the ${:.2} ceiling ({:.0}% of your ${:.2} salary).",
                cost,
                salary_fraction_limit,
                self.policy.purchase_salary_fraction * 100.0,
                monthly_salary
            )
        };

        let alternative_plan = (!affordable).then(|| self.save_up_plan(cost));
        let summary = DecisionSummary::new(
            DecisionType::Purchase,
            affordable,
            json!({
                "cost": cost,
                "monthly_salary": monthly_salary,
                "salary_fraction_limit": salary_fraction_limit,
            }),
        );
        let reasoning = self.narrate(summary, fallback).await;

        Ok(AffordabilityVerdict {
            affordable,
            reasoning,
            alternative_plan,
            impact_analysis: ImpactAnalysis::Purchase {
                cost,
                monthly_salary,
                salary_fraction_limit,
                within_salary_fraction,
            },
        })
    }

    /// Should the user add another subscription?
    ///
    /// Inadvisable when the new total recurring spend exceeds the policy
    /// fraction of monthly salary.
    pub async fn evaluate_subscription(
        &self,
        monthly_cost: f64,
        existing: &[RecurringCharge],
        monthly_salary: f64,
    ) -> Result<AffordabilityVerdict> {
        validate_salary(monthly_salary)?;
        validate_cost("monthly_cost", monthly_cost)?;

        let existing_monthly_total: f64 = existing.iter().map(|s| s.monthly_cost).sum();
        let new_monthly_total = existing_monthly_total + monthly_cost;
        let budget_cap = self.policy.subscription_salary_fraction * monthly_salary;
        let within_cap = new_monthly_total <= budget_cap;
        let affordable = within_cap;

        let fallback = if affordable {
            format!(
                "Adding ${:.2}/mo brings recurring subscriptions to ${:.2}/mo, \
                 within the ${:.2} cap ({:.0}% of salary).",
                monthly_cost,
                new_monthly_total,
                budget_cap,
                self.policy.subscription_salary_fraction * 100.0
            )
        } else {
            format!(
                "Declined: ${:.2}/mo would push recurring subscriptions to ${:.2}/mo, \
                 over the ${:.2} cap ({:.0}% of salary). Consider cancelling one of the \
                 {} you already pay for.",
                monthly_cost,
                new_monthly_total,
                budget_cap,
                self.policy.subscription_salary_fraction * 100.0,
                existing.len()
            )
        };

        let summary = DecisionSummary::new(
            DecisionType::Subscription,
            affordable,
            json!({
                "monthly_cost": monthly_cost,
                "existing_monthly_total": existing_monthly_total,
                "new_monthly_total": new_monthly_total,
                "budget_cap": budget_cap,
            }),
        );
        let reasoning = self.narrate(summary, fallback).await;

        Ok(AffordabilityVerdict {
            affordable,
            reasoning,
            alternative_plan: None,
            impact_analysis: ImpactAnalysis::Subscription {
                monthly_cost,
                existing_monthly_total,
                new_monthly_total,
                budget_cap,
                within_cap,
            },
        })
    }

    /// Rent-vs-buy comparison for a housing decision
    ///
    /// Recommends whichever option has the lower monthly cost, but only
    /// ever recommends buying when the down payment clears the policy
    /// minimum; an inadequate down payment gates the comparison entirely.
    pub async fn rent_vs_buy(
        &self,
        monthly_rent: f64,
        purchase_price: f64,
        down_payment_available: f64,
    ) -> Result<AffordabilityVerdict> {
        validate_cost("monthly_rent", monthly_rent)?;
        validate_cost("purchase_price", purchase_price)?;
        validate_cost("down_payment_available", down_payment_available)?;

        let required_down_payment = purchase_price * self.policy.min_down_payment_fraction;
        let down_payment_adequate = down_payment_available >= required_down_payment;
        let principal = (purchase_price - down_payment_available).max(0.0);
        let monthly_buy_cost = self.monthly_mortgage_cost(principal);

        let recommendation = if down_payment_adequate && monthly_buy_cost < monthly_rent {
            HousingChoice::Buy
        } else {
            HousingChoice::Rent
        };
        let affordable = recommendation == HousingChoice::Buy;

        let fallback = if !down_payment_adequate {
            format!(
                "Keep renting: your ${:.2} down payment is below the ${:.2} minimum \
                 ({:.0}% of the ${:.2} price), so buying isn't on the table yet.",
                down_payment_available,
                required_down_payment,
                self.policy.min_down_payment_fraction * 100.0,
                purchase_price
            )
        } else if affordable {
            format!(
                "Buying wins: ${:.2}/mo amortized against ${:.2}/mo rent, with the \
                 down payment covering the {:.0}% minimum.",
                monthly_buy_cost,
                monthly_rent,
                self.policy.min_down_payment_fraction * 100.0
            )
        } else {
            format!(
                "Keep renting: ${:.2}/mo rent beats the ${:.2}/mo amortized cost of buying.",
                monthly_rent, monthly_buy_cost
            )
        };

        // When the down payment is the blocker, the plan saves toward the gap
        let alternative_plan = (!down_payment_adequate)
            .then(|| self.save_up_plan(required_down_payment - down_payment_available));

        let summary = DecisionSummary::new(
            DecisionType::RentVsBuy,
            affordable,
            json!({
                "monthly_rent": monthly_rent,
                "purchase_price": purchase_price,
                "down_payment": down_payment_available,
                "required_down_payment": required_down_payment,
                "monthly_buy_cost": monthly_buy_cost,
            }),
        );
        let reasoning = self.narrate(summary, fallback).await;

        Ok(AffordabilityVerdict {
            affordable,
            reasoning,
            alternative_plan,
            impact_analysis: ImpactAnalysis::RentVsBuy {
                monthly_rent,
                purchase_price,
                down_payment: down_payment_available,
                required_down_payment,
                down_payment_adequate,
                monthly_buy_cost,
                recommendation,
            },
        })
    }

    /// Financial impact of a job change
    ///
    /// Compares the new salary net of any cost-of-living delta against
    /// current disposable income; moves that reduce disposable income are
    /// flagged as requiring explicit confirmation.
    pub async fn career_move(
        &self,
        new_salary: f64,
        cost_of_living_delta: f64,
        current_budget: &Budget,
    ) -> Result<AffordabilityVerdict> {
        if new_salary <= 0.0 {
            return Err(Error::invalid_input(
                "new_salary",
                format!("must be positive, got {}", new_salary),
            ));
        }

        let current_disposable = current_budget.disposable_income();
        let new_disposable =
            new_salary - (current_budget.essential_expenses + cost_of_living_delta);
        let disposable_delta = new_disposable - current_disposable;
        let requires_confirmation = disposable_delta < 0.0;
        let affordable = !requires_confirmation;

        let fallback = if affordable {
            format!(
                "The move raises disposable income from ${:.2} to ${:.2}/mo \
                 after a ${:.2} cost-of-living change.",
                current_disposable, new_disposable, cost_of_living_delta
            )
        } else {
            format!(
                "This move cuts disposable income by ${:.2}/mo (${:.2} down to ${:.2} \
                 after the ${:.2} cost-of-living change) - confirm explicitly before accepting.",
                -disposable_delta, current_disposable, new_disposable, cost_of_living_delta
            )
        };

        let summary = DecisionSummary::new(
            DecisionType::CareerMove,
            affordable,
            json!({
                "new_salary": new_salary,
                "cost_of_living_delta": cost_of_living_delta,
                "current_disposable": current_disposable,
                "new_disposable": new_disposable,
            }),
        );
        let reasoning = self.narrate(summary, fallback).await;

        Ok(AffordabilityVerdict {
            affordable,
            reasoning,
            alternative_plan: None,
            impact_analysis: ImpactAnalysis::CareerMove {
                new_salary,
                cost_of_living_delta,
                current_disposable,
                new_disposable,
                disposable_delta,
                requires_confirmation,
            },
        })
    }

    /// Save-up plan over the policy horizon
    fn save_up_plan(&self, amount: f64) -> AlternativePlan {
        let horizon_months = self.policy.plan_horizon_months;
        let monthly_savings_needed = amount / f64::from(horizon_months);
        AlternativePlan {
            monthly_savings_needed,
            horizon_months,
            summary: format!(
                "Save ${:.2}/month for {} months",
                monthly_savings_needed, horizon_months
            ),
        }
    }

    /// Standard amortized monthly payment at the assumed rate and term
    fn monthly_mortgage_cost(&self, principal: f64) -> f64 {
        if principal <= 0.0 {
            return 0.0;
        }
        let n = f64::from(self.policy.mortgage_term_years * 12);
        let r = self.policy.mortgage_rate / 12.0;
        if r <= 0.0 {
            return principal / n;
        }
        let growth = (1.0 + r).powf(n);
        principal * (r * growth) / (growth - 1.0)
    }

    /// Enrich the fallback reasoning via the narrative backend, absorbing
    /// any failure. The verdict itself was already decided.
    async fn narrate(&self, summary: DecisionSummary, fallback: String) -> String {
        let Some(client) = &self.narrative else {
            return fallback;
        };
        match client.explain(&summary).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback,
            Err(e) => {
                warn!(
                    decision = summary.decision.as_str(),
                    error = %e,
                    "Narrative enrichment failed, using fallback reasoning"
                );
                fallback
            }
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_salary(monthly_salary: f64) -> Result<()> {
    if monthly_salary <= 0.0 {
        return Err(Error::invalid_input(
            "monthly_salary",
            format!("must be positive, got {}", monthly_salary),
        ));
    }
    Ok(())
}

fn validate_cost(field: &'static str, cost: f64) -> Result<()> {
    if cost < 0.0 {
        return Err(Error::invalid_input(
            field,
            format!("must be non-negative, got {}", cost),
        ));
    }
    Ok(())
}
