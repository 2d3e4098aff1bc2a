//! Achievement badges and their fixed catalog.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys of the six catalog badges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstExpense,
    BudgetMaster,
    SavingsStarter,
    GoalAchieved,
    ExpenseTracker,
    ConsistentSaver,
}

impl AchievementId {
    pub const ALL: [AchievementId; 6] = [
        AchievementId::FirstExpense,
        AchievementId::BudgetMaster,
        AchievementId::SavingsStarter,
        AchievementId::GoalAchieved,
        AchievementId::ExpenseTracker,
        AchievementId::ConsistentSaver,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AchievementId::FirstExpense => "first_expense",
            AchievementId::BudgetMaster => "budget_master",
            AchievementId::SavingsStarter => "savings_starter",
            AchievementId::GoalAchieved => "goal_achieved",
            AchievementId::ExpenseTracker => "expense_tracker",
            AchievementId::ConsistentSaver => "consistent_saver",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key.trim())
    }

    fn details(self) -> (&'static str, &'static str, &'static str) {
        match self {
            AchievementId::FirstExpense => ("First Step", "Added your first expense", "🎯"),
            AchievementId::BudgetMaster => {
                ("Budget Master", "Stayed within budget for a week", "💰")
            }
            AchievementId::SavingsStarter => {
                ("Savings Starter", "Created your first savings goal", "🌱")
            }
            AchievementId::GoalAchieved => ("Goal Crusher", "Completed a savings goal", "🏆"),
            AchievementId::ExpenseTracker => ("Tracker Pro", "Logged 10 expenses", "📊"),
            AchievementId::ConsistentSaver => {
                ("Consistent Saver", "Saved for 7 consecutive days", "⭐")
            }
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A badge as stored for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl Achievement {
    pub fn locked(id: AchievementId, user_id: impl Into<String>) -> Self {
        let (title, description, icon) = id.details();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            unlocked_at: None,
            user_id: user_id.into(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Sets the unlock time once. Returns `false` when already unlocked.
    pub fn unlock(&mut self, at: DateTime<Utc>) -> bool {
        if self.unlocked_at.is_some() {
            return false;
        }
        self.unlocked_at = Some(at);
        true
    }
}

/// Seeds the full catalog, all locked, for `user_id`.
pub fn achievement_catalog(user_id: &str) -> Vec<Achievement> {
    AchievementId::ALL
        .into_iter()
        .map(|id| Achievement::locked(id, user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn catalog_has_six_locked_entries() {
        let catalog = achievement_catalog("u1");
        assert_eq!(catalog.len(), 6);
        assert!(catalog.iter().all(|a| !a.is_unlocked() && a.user_id == "u1"));
        assert_eq!(catalog[3].title, "Goal Crusher");
    }

    #[test]
    fn unlock_never_overwrites_timestamp() {
        let mut badge = Achievement::locked(AchievementId::FirstExpense, "u1");
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();
        assert!(badge.unlock(first));
        assert!(!badge.unlock(later));
        assert_eq!(badge.unlocked_at, Some(first));
    }

    #[test]
    fn stored_keys_match_wire_format() {
        let json = r#"{"id":"goal_achieved","title":"Goal Crusher","description":"Completed a savings goal",
            "icon":"🏆","unlockedAt":"2024-06-10T10:00:00.000Z","userId":"7"}"#;
        let badge: Achievement = serde_json::from_str(json).expect("legacy achievement");
        assert_eq!(badge.id, AchievementId::GoalAchieved);
        assert!(badge.is_unlocked());
        assert_eq!(AchievementId::from_key("consistent_saver"), Some(AchievementId::ConsistentSaver));
    }
}
