//! Domain types representing savings goals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A savings target with a deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributions: Vec<Contribution>,
}

impl Goal {
    pub fn new(input: GoalInput, user_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: input.name,
            target_amount: input.target_amount,
            current_amount: 0.0,
            deadline: input.deadline,
            user_id: user_id.into(),
            contributions: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount still missing; negative once the goal is overfunded.
    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_amount
    }

    pub fn record_contribution(&mut self, amount: f64, date: NaiveDate) {
        self.current_amount += amount;
        self.contributions.push(Contribution { amount, date });
    }

    /// Applies every field present in `patch`.
    pub fn apply(&mut self, patch: GoalPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(target) = patch.target_amount {
            self.target_amount = target;
        }
        if let Some(current) = patch.current_amount {
            self.current_amount = current;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
    }
}

impl Identifiable for Goal {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Goal {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for Goal {
    fn amount(&self) -> f64 {
        self.current_amount
    }
}

impl Displayable for Goal {
    fn display_label(&self) -> String {
        format!("{} (due {})", self.name, self.deadline)
    }
}

/// One deposit towards a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contribution {
    pub amount: f64,
    pub date: NaiveDate,
}

/// Fields supplied when creating a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalInput {
    pub name: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
}

impl GoalInput {
    pub fn new(name: impl Into<String>, target_amount: f64, deadline: NaiveDate) -> Self {
        Self {
            name: name.into(),
            target_amount,
            deadline,
        }
    }
}

/// Partial update for an existing goal; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub current_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    }

    #[test]
    fn new_goal_starts_empty() {
        let goal = Goal::new(GoalInput::new("Laptop", 60000.0, deadline()), "u1");
        assert_eq!(goal.current_amount, 0.0);
        assert!(!goal.is_completed());
        assert!(goal.contributions.is_empty());
    }

    #[test]
    fn legacy_goal_without_contribution_log_loads() {
        let json = r#"{"id":"1","name":"Trip","targetAmount":20000,"currentAmount":5000,
            "deadline":"2025-05-01","userId":"42"}"#;
        let goal: Goal = serde_json::from_str(json).expect("legacy goal");
        assert_eq!(goal.remaining(), 15000.0);
        assert!(goal.contributions.is_empty());
        let encoded = serde_json::to_string(&goal).unwrap();
        assert!(!encoded.contains("contributions"));
    }

    #[test]
    fn overfunded_goal_counts_as_completed() {
        let mut goal = Goal::new(GoalInput::new("Phone", 100.0, deadline()), "u1");
        goal.record_contribution(150.0, deadline());
        assert!(goal.is_completed());
        assert_eq!(goal.remaining(), -50.0);
        assert_eq!(goal.contributions.len(), 1);
    }
}
