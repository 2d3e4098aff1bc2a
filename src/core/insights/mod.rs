//! Rule-based narratives derived from the aggregates in [`crate::core::analytics`].
//!
//! [`generate_insights`] evaluates an ordered rule list where each rule
//! contributes at most one [`Insight`]. [`generate_monthly_insights`] reports
//! month-level trends for the analytics view. Neither function returns an
//! error: faults are logged and replaced by a single fallback entry.

mod monthly;
mod rules;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Expense, Goal};

pub use monthly::{generate_monthly_insights, MonthlyInsight};

/// Severity used when rendering an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Tip,
    Info,
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InsightKind::Warning => "warning",
            InsightKind::Success => "success",
            InsightKind::Tip => "tip",
            InsightKind::Info => "info",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub narrative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Insight {
    pub fn new(kind: InsightKind, title: impl Into<String>, narrative: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            narrative: narrative.into(),
            recommendation: None,
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    /// Static entry shown in place of the rule output when generation fails.
    pub fn unavailable() -> Self {
        Insight::new(
            InsightKind::Info,
            "Insights Unavailable",
            "We couldn't analyse your data right now. Your records are safe; check recent entries for unusual values and try again.",
        )
    }
}

/// Faults raised while evaluating rules. Never leaves this module.
#[derive(Debug, Error, PartialEq)]
pub enum InsightError {
    #[error("expense `{id}` has an invalid amount ({amount})")]
    InvalidExpense { id: String, amount: f64 },
    #[error("goal `{id}` has invalid amounts (target {target}, current {current})")]
    InvalidGoal { id: String, target: f64, current: f64 },
    #[error("income must be a finite, non-negative number (got {0})")]
    InvalidIncome(f64),
}

pub(crate) type InsightResult<T> = Result<T, InsightError>;

/// Ordered insight list for the given records. Empty when there are no expenses.
pub fn generate_insights(
    expenses: &[Expense],
    income: f64,
    goals: &[Goal],
    now: DateTime<Utc>,
) -> Vec<Insight> {
    match rules::evaluate(expenses, income, goals, now) {
        Ok(insights) => {
            tracing::debug!(count = insights.len(), "generated insights");
            insights
        }
        Err(err) => {
            tracing::warn!(error = %err, "insight generation failed, using fallback");
            vec![Insight::unavailable()]
        }
    }
}

fn validate(expenses: &[Expense], income: f64, goals: &[Goal]) -> InsightResult<()> {
    if !income.is_finite() || income < 0.0 {
        return Err(InsightError::InvalidIncome(income));
    }
    if let Some(bad) = expenses
        .iter()
        .find(|e| !e.amount.is_finite() || e.amount < 0.0)
    {
        return Err(InsightError::InvalidExpense {
            id: bad.id.clone(),
            amount: bad.amount,
        });
    }
    if let Some(bad) = goals.iter().find(|g| {
        !g.target_amount.is_finite() || !g.current_amount.is_finite() || g.target_amount <= 0.0
    }) {
        return Err(InsightError::InvalidGoal {
            id: bad.id.clone(),
            target: bad.target_amount,
            current: bad.current_amount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{Clock, FixedClock};
    use crate::domain::{ExpenseCategory, ExpenseInput};
    use chrono::NaiveDate;

    #[test]
    fn no_expenses_no_insights() {
        let now = FixedClock::at_date(2025, 4, 10).now();
        assert!(generate_insights(&[], 50_000.0, &[], now).is_empty());
    }

    #[test]
    fn malformed_record_yields_single_fallback() {
        let now = FixedClock::at_date(2025, 4, 10).now();
        let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let mut broken = Expense::new(ExpenseInput::new(10.0, ExpenseCategory::Food, date), "u1");
        broken.amount = f64::NAN;
        let insights = generate_insights(&[broken], 1000.0, &[], now);
        assert_eq!(insights, vec![Insight::unavailable()]);
        assert_eq!(insights[0].kind, InsightKind::Info);
    }

    #[test]
    fn non_finite_income_is_rejected() {
        assert_eq!(
            validate(&[], f64::INFINITY, &[]),
            Err(InsightError::InvalidIncome(f64::INFINITY))
        );
    }
}
