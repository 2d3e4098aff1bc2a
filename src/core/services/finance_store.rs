//! The record store: the only component that mutates finance state.
//!
//! Every mutation validates first, persists the affected collection and only
//! then commits it in memory, so a rejected or failed call leaves state intact.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::achievements::{evaluate, AchievementTrigger};
use crate::core::analytics::FinanceSnapshot;
use crate::core::insights::{generate_insights, generate_monthly_insights, Insight, MonthlyInsight};
use crate::core::time::Clock;
use crate::domain::{
    achievement_catalog, Achievement, AchievementId, Expense, ExpenseCategory, ExpenseInput,
    ExpensePatch, Goal, GoalInput, GoalPatch, User,
};
use crate::errors::StorageError;
use crate::storage::{keys, KeyValueStore};

use super::{ServiceError, ServiceResult};

pub struct FinanceStore {
    store: Arc<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    user: Option<User>,
    expenses: Vec<Expense>,
    goals: Vec<Goal>,
    achievements: Vec<Achievement>,
    income: f64,
    unlocked: Vec<AchievementId>,
}

impl FinanceStore {
    /// Creates an unbound store; call [`FinanceStore::switch_user`] before mutating.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            user: None,
            expenses: Vec::new(),
            goals: Vec::new(),
            achievements: Vec::new(),
            income: 0.0,
            unlocked: Vec::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn snapshot(&self) -> FinanceSnapshot<'_> {
        FinanceSnapshot::new(&self.expenses, &self.goals, &self.achievements, self.income)
    }

    /// Insights for the current records at the store clock's time.
    pub fn insights(&self) -> Vec<Insight> {
        generate_insights(&self.expenses, self.income, &self.goals, self.now())
    }

    /// Monthly observations over the most recent `months` months.
    pub fn monthly_insights(&self, months: usize) -> Vec<MonthlyInsight> {
        use crate::core::analytics::{category_totals, current_month_expenses, last_n_months};
        let recent = last_n_months(&self.expenses, months);
        let categories = category_totals(&current_month_expenses(&self.expenses, self.now()));
        generate_monthly_insights(&recent, &categories, self.income)
    }

    /// Achievements unlocked since the last call, oldest first.
    pub fn take_unlocked(&mut self) -> Vec<Achievement> {
        let ids = std::mem::take(&mut self.unlocked);
        ids.iter()
            .filter_map(|id| self.achievements.iter().find(|a| a.id == *id).cloned())
            .collect()
    }

    /// Clears all collections, then loads (or defaults) the records of `user`.
    pub fn switch_user(&mut self, user: Option<&User>) -> ServiceResult<()> {
        self.user = None;
        self.expenses.clear();
        self.goals.clear();
        self.achievements.clear();
        self.income = 0.0;
        self.unlocked.clear();

        let Some(user) = user else {
            tracing::info!("finance store cleared");
            return Ok(());
        };
        let id = user.id.as_str();
        let expenses = self.load_or_default(&keys::expenses(id))?;
        let goals = self.load_or_default(&keys::goals(id))?;
        let stored: Option<Vec<Achievement>> = self.load(&keys::achievements(id))?;
        let income: Option<f64> = self.load(&keys::income(id))?;

        self.expenses = expenses;
        self.goals = goals;
        self.achievements = merge_catalog(stored.unwrap_or_default(), id);
        self.income = income.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0);
        self.user = Some(user.clone());
        tracing::info!(
            user = id,
            expenses = self.expenses.len(),
            goals = self.goals.len(),
            "loaded finance records"
        );
        Ok(())
    }

    /// Re-reads the bound user's records, e.g. after a backup restore.
    pub fn reload(&mut self) -> ServiceResult<()> {
        let user = self.user.clone();
        self.switch_user(user.as_ref())
    }

    pub fn add_expense(&mut self, input: ExpenseInput) -> ServiceResult<Expense> {
        let user_id = self.user_id()?;
        validate_amount(input.amount, "expense amount")?;
        validate_category(&input.category)?;
        let expense = Expense::new(input, user_id);

        let mut next = self.expenses.clone();
        next.push(expense.clone());
        self.write(&keys::expenses(&expense.user_id), &next)?;
        self.expenses = next;
        tracing::info!(id = %expense.id, amount = expense.amount, "added expense");

        self.apply_achievements(AchievementTrigger::ExpenseAdded)?;
        Ok(expense)
    }

    pub fn update_expense(&mut self, id: &str, patch: ExpensePatch) -> ServiceResult<()> {
        let user_id = self.user_id()?;
        if let Some(amount) = patch.amount {
            validate_amount(amount, "expense amount")?;
        }
        if let Some(category) = &patch.category {
            validate_category(category)?;
        }
        let mut next = self.expenses.clone();
        let expense = next
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("expense", id))?;
        expense.apply(patch);
        self.write(&keys::expenses(&user_id), &next)?;
        self.expenses = next;
        tracing::info!(id, "updated expense");
        Ok(())
    }

    pub fn delete_expense(&mut self, id: &str) -> ServiceResult<Expense> {
        let user_id = self.user_id()?;
        let pos = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found("expense", id))?;
        let mut next = self.expenses.clone();
        let removed = next.remove(pos);
        self.write(&keys::expenses(&user_id), &next)?;
        self.expenses = next;
        tracing::info!(id, "deleted expense");
        Ok(removed)
    }

    pub fn add_goal(&mut self, input: GoalInput) -> ServiceResult<Goal> {
        let user_id = self.user_id()?;
        validate_name(&input.name)?;
        validate_target(input.target_amount)?;
        let goal = Goal::new(input, user_id);

        let mut next = self.goals.clone();
        next.push(goal.clone());
        self.write(&keys::goals(&goal.user_id), &next)?;
        self.goals = next;
        tracing::info!(id = %goal.id, target = goal.target_amount, "added goal");

        self.apply_achievements(AchievementTrigger::GoalAdded)?;
        Ok(goal)
    }

    pub fn update_goal(&mut self, id: &str, patch: GoalPatch) -> ServiceResult<()> {
        let user_id = self.user_id()?;
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(target) = patch.target_amount {
            validate_target(target)?;
        }
        if let Some(current) = patch.current_amount {
            validate_amount(current, "current amount")?;
        }
        let mut next = self.goals.clone();
        let goal = next
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("goal", id))?;
        goal.apply(patch);
        self.write(&keys::goals(&user_id), &next)?;
        self.goals = next;
        tracing::info!(id, "updated goal");
        Ok(())
    }

    pub fn delete_goal(&mut self, id: &str) -> ServiceResult<Goal> {
        let user_id = self.user_id()?;
        let pos = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| not_found("goal", id))?;
        let mut next = self.goals.clone();
        let removed = next.remove(pos);
        self.write(&keys::goals(&user_id), &next)?;
        self.goals = next;
        tracing::info!(id, "deleted goal");
        Ok(removed)
    }

    pub fn contribute_to_goal(&mut self, id: &str, amount: f64) -> ServiceResult<Goal> {
        let user_id = self.user_id()?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ServiceError::invalid(
                "contribution must be a positive number",
            ));
        }
        let today = self.clock.today();
        let mut next = self.goals.clone();
        let goal = next
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("goal", id))?;
        goal.record_contribution(amount, today);
        let updated = goal.clone();
        self.write(&keys::goals(&user_id), &next)?;
        self.goals = next;
        tracing::info!(id, amount, "recorded contribution");

        self.apply_achievements(AchievementTrigger::GoalContributed {
            goal_id: updated.id.clone(),
            date: today,
        })?;
        Ok(updated)
    }

    pub fn set_income(&mut self, income: f64) -> ServiceResult<()> {
        let user_id = self.user_id()?;
        validate_amount(income, "income")?;
        self.write(&keys::income(&user_id), &income)?;
        self.income = income;
        tracing::info!(income, "set income");
        Ok(())
    }

    /// Unlocks `id` once; returns `false` when it was already unlocked.
    pub fn unlock_achievement(&mut self, id: AchievementId) -> ServiceResult<bool> {
        let user_id = self.user_id()?;
        let now = self.clock.now();
        let mut next = self.achievements.clone();
        let changed = match next.iter_mut().find(|a| a.id == id) {
            Some(badge) => badge.unlock(now),
            None => {
                let mut badge = Achievement::locked(id, user_id.clone());
                badge.unlock(now);
                next.push(badge);
                true
            }
        };
        if !changed {
            return Ok(false);
        }
        self.write(&keys::achievements(&user_id), &next)?;
        self.achievements = next;
        self.unlocked.push(id);
        tracing::info!(achievement = %id, "unlocked achievement");
        Ok(true)
    }

    fn apply_achievements(&mut self, trigger: AchievementTrigger) -> ServiceResult<()> {
        let earned = evaluate(&trigger, &self.snapshot());
        for id in earned {
            self.unlock_achievement(id)?;
        }
        Ok(())
    }

    fn user_id(&self) -> ServiceResult<String> {
        self.user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(ServiceError::NoActiveUser)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ServiceResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> ServiceResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                let corrupt = StorageError::Corrupt {
                    key: key.to_string(),
                    reason: err.to_string(),
                };
                let kept = self.store.quarantine(key, &raw)?;
                tracing::warn!(error = %corrupt, kept = %kept, "unreadable stored value set aside");
                Ok(None)
            }
        }
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> ServiceResult<T> {
        Ok(self.load(key)?.unwrap_or_default())
    }
}

/// Appends catalog entries missing from stored data, keeping stored order.
fn merge_catalog(mut stored: Vec<Achievement>, user_id: &str) -> Vec<Achievement> {
    for badge in achievement_catalog(user_id) {
        if !stored.iter().any(|a| a.id == badge.id) {
            stored.push(badge);
        }
    }
    stored
}

fn not_found(kind: &'static str, id: &str) -> ServiceError {
    ServiceError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn validate_amount(value: f64, field: &str) -> ServiceResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::invalid(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

fn validate_target(value: f64) -> ServiceResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ServiceError::invalid("target amount must be greater than zero"));
    }
    Ok(())
}

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::invalid("goal name is required"));
    }
    Ok(())
}

fn validate_category(category: &ExpenseCategory) -> ServiceResult<()> {
    if category.label().trim().is_empty() {
        return Err(ServiceError::invalid("category is required"));
    }
    Ok(())
}
