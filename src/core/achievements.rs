//! Decides which badges a record-store mutation unlocks.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::core::analytics::FinanceSnapshot;
use crate::domain::AchievementId;

/// Consecutive contribution days required for `consistent_saver`.
pub const SAVING_STREAK_DAYS: i64 = 7;
const TRACKER_EXPENSE_COUNT: usize = 10;

/// The mutation that just happened, with the state after it applied.
#[derive(Debug, Clone, PartialEq)]
pub enum AchievementTrigger {
    ExpenseAdded,
    GoalAdded,
    GoalContributed { goal_id: String, date: NaiveDate },
}

/// Ids to unlock for `trigger`, excluding any already unlocked in `snapshot`.
pub fn evaluate(trigger: &AchievementTrigger, snapshot: &FinanceSnapshot<'_>) -> Vec<AchievementId> {
    let mut earned = Vec::new();
    match trigger {
        AchievementTrigger::ExpenseAdded => {
            let count = snapshot.expenses.len();
            if count == 1 {
                earned.push(AchievementId::FirstExpense);
            }
            if count == TRACKER_EXPENSE_COUNT {
                earned.push(AchievementId::ExpenseTracker);
            }
        }
        AchievementTrigger::GoalAdded => {
            if snapshot.goals.len() == 1 {
                earned.push(AchievementId::SavingsStarter);
            }
        }
        AchievementTrigger::GoalContributed { goal_id, date } => {
            let completed = snapshot
                .goals
                .iter()
                .any(|g| &g.id == goal_id && g.is_completed());
            if completed {
                earned.push(AchievementId::GoalAchieved);
            }
            if has_saving_streak(snapshot, *date) {
                earned.push(AchievementId::ConsistentSaver);
            }
        }
    }
    earned.retain(|id| {
        !snapshot
            .achievements
            .iter()
            .any(|a| a.id == *id && a.is_unlocked())
    });
    earned
}

/// True when every one of the seven days ending at `end` has a contribution.
fn has_saving_streak(snapshot: &FinanceSnapshot<'_>, end: NaiveDate) -> bool {
    let days: BTreeSet<NaiveDate> = snapshot
        .goals
        .iter()
        .flat_map(|g| g.contributions.iter().map(|c| c.date))
        .collect();
    (0..SAVING_STREAK_DAYS).all(|offset| days.contains(&(end - Duration::days(offset))))
}
