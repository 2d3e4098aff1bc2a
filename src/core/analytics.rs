//! Pure aggregations over a user's finance records.
//!
//! Every function here is deterministic, takes its inputs by reference and
//! never mutates them. Divisions are guarded so results never contain NaN.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::core::time::days_until;
use crate::domain::{Achievement, Expense, ExpenseCategory, Goal, YearMonth};

/// Borrowed view of one user's records, handed to the aggregator and insight engine.
#[derive(Debug, Clone, Copy)]
pub struct FinanceSnapshot<'a> {
    pub expenses: &'a [Expense],
    pub goals: &'a [Goal],
    pub achievements: &'a [Achievement],
    pub income: f64,
}

impl<'a> FinanceSnapshot<'a> {
    pub fn new(
        expenses: &'a [Expense],
        goals: &'a [Goal],
        achievements: &'a [Achievement],
        income: f64,
    ) -> Self {
        Self {
            expenses,
            goals,
            achievements,
            income,
        }
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub key: YearMonth,
    pub label: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCategoryBreakdown {
    pub key: YearMonth,
    pub label: String,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTotal {
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TransactionStats {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalStatus {
    Completed,
    InProgress,
    DeadlinePassed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    /// `current / target`, unclamped.
    pub ratio: f64,
    /// Progress percentage clamped to `0..=100`.
    pub progress_pct: f64,
    pub days_left: i64,
    pub amount_left: f64,
    pub daily_amount_needed: f64,
    pub completed: bool,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GoalTotals {
    pub target: f64,
    pub saved: f64,
    pub completed: usize,
    pub count: usize,
    /// `saved / target * 100`, 0 when there is no target.
    pub overall_pct: f64,
}

/// Sums amounts per category, largest first; ties keep first-appearance order.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&ExpenseCategory, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match index.get(&expense.category) {
            Some(&pos) => totals[pos].total += expense.amount,
            None => {
                index.insert(&expense.category, totals.len());
                totals.push(CategoryTotal {
                    category: expense.category.clone(),
                    total: expense.amount,
                });
            }
        }
    }
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    tracing::debug!(categories = totals.len(), "computed category totals");
    totals
}

/// Percentage of all spending that falls in `category`.
pub fn category_share(totals: &[CategoryTotal], category: &ExpenseCategory) -> f64 {
    let sum: f64 = totals.iter().map(|t| t.total).sum();
    totals
        .iter()
        .find(|t| &t.category == category)
        .map(|t| crate::core::format::share_pct(t.total, sum))
        .unwrap_or(0.0)
}

/// Totals per calendar month, oldest first.
pub fn monthly_totals(expenses: &[Expense]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for expense in expenses {
        *months.entry(YearMonth::of(expense.date)).or_insert(0.0) += expense.amount;
    }
    months
        .into_iter()
        .map(|(key, total)| MonthlyTotal {
            key,
            label: key.label(),
            total,
        })
        .collect()
}

/// The most recent `n` months that have any spending.
pub fn last_n_months(expenses: &[Expense], n: usize) -> Vec<MonthlyTotal> {
    let mut months = monthly_totals(expenses);
    let skip = months.len().saturating_sub(n);
    months.drain(..skip);
    months
}

/// Per-month category breakdown, oldest month first.
pub fn monthly_category_totals(expenses: &[Expense]) -> Vec<MonthlyCategoryBreakdown> {
    let mut grouped: BTreeMap<YearMonth, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        grouped
            .entry(YearMonth::of(expense.date))
            .or_default()
            .push(expense.clone());
    }
    grouped
        .into_iter()
        .map(|(key, items)| MonthlyCategoryBreakdown {
            key,
            label: key.label(),
            categories: category_totals(&items),
        })
        .collect()
}

/// Totals per ISO week (Monday start), oldest first.
pub fn weekly_totals(expenses: &[Expense]) -> Vec<WeeklyTotal> {
    let mut weeks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for expense in expenses {
        let offset = i64::from(expense.date.weekday().num_days_from_monday());
        let week_start = expense.date - Duration::days(offset);
        *weeks.entry(week_start).or_insert(0.0) += expense.amount;
    }
    weeks
        .into_iter()
        .map(|(week_start, total)| WeeklyTotal { week_start, total })
        .collect()
}

pub fn month_total(expenses: &[Expense], month: YearMonth) -> f64 {
    expenses
        .iter()
        .filter(|e| month.contains(e.date))
        .map(|e| e.amount)
        .sum()
}

pub fn current_month_total(expenses: &[Expense], now: DateTime<Utc>) -> f64 {
    month_total(expenses, YearMonth::of(now.date_naive()))
}

pub fn previous_month_total(expenses: &[Expense], now: DateTime<Utc>) -> f64 {
    month_total(expenses, YearMonth::of(now.date_naive()).previous())
}

/// Expenses dated within the month containing `now`.
pub fn current_month_expenses(expenses: &[Expense], now: DateTime<Utc>) -> Vec<Expense> {
    let month = YearMonth::of(now.date_naive());
    expenses
        .iter()
        .filter(|e| month.contains(e.date))
        .cloned()
        .collect()
}

pub fn transaction_stats(expenses: &[Expense]) -> TransactionStats {
    if expenses.is_empty() {
        return TransactionStats::default();
    }
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let max = expenses.iter().map(|e| e.amount).fold(f64::MIN, f64::max);
    let min = expenses.iter().map(|e| e.amount).fold(f64::MAX, f64::min);
    TransactionStats {
        count: expenses.len(),
        total,
        average: total / expenses.len() as f64,
        max,
        min,
    }
}

/// Percentage of income left after `month_total`; `None` while income is unset.
pub fn savings_rate(income: f64, month_total: f64) -> Option<f64> {
    if income > 0.0 && income.is_finite() {
        Some((income - month_total) / income * 100.0)
    } else {
        None
    }
}

pub fn goal_progress(goal: &Goal, now: DateTime<Utc>) -> GoalProgress {
    let completed = goal.is_completed();
    let ratio = if goal.target_amount > 0.0 {
        goal.current_amount / goal.target_amount
    } else if completed {
        1.0
    } else {
        0.0
    };
    let days_left = days_until(goal.deadline, now);
    let amount_left = goal.remaining().max(0.0);
    let daily_amount_needed = if days_left > 0 && !completed {
        (amount_left / days_left as f64).ceil()
    } else {
        0.0
    };
    let status = if completed {
        GoalStatus::Completed
    } else if days_left > 0 {
        GoalStatus::InProgress
    } else {
        GoalStatus::DeadlinePassed
    };
    GoalProgress {
        ratio,
        progress_pct: (ratio * 100.0).clamp(0.0, 100.0),
        days_left,
        amount_left,
        daily_amount_needed,
        completed,
        status,
    }
}

pub fn goal_totals(goals: &[Goal]) -> GoalTotals {
    let target: f64 = goals.iter().map(|g| g.target_amount).sum();
    let saved: f64 = goals.iter().map(|g| g.current_amount).sum();
    GoalTotals {
        target,
        saved,
        completed: goals.iter().filter(|g| g.is_completed()).count(),
        count: goals.len(),
        overall_pct: crate::core::format::share_pct(saved, target),
    }
}

/// Sorts newest first; equal dates keep their stored order.
fn newest_first(mut expenses: Vec<Expense>) -> Vec<Expense> {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    expenses
}

/// The `n` most recent expenses.
pub fn recent_expenses(expenses: &[Expense], n: usize) -> Vec<Expense> {
    let mut sorted = newest_first(expenses.to_vec());
    sorted.truncate(n);
    sorted
}

/// Case-insensitive search over description and category, optionally limited to one category.
pub fn filter_expenses(
    expenses: &[Expense],
    query: &str,
    category: Option<&ExpenseCategory>,
) -> Vec<Expense> {
    let needle = query.trim().to_lowercase();
    let matches = expenses
        .iter()
        .filter(|e| {
            needle.is_empty()
                || e.description.to_lowercase().contains(&needle)
                || e.category.label().to_lowercase().contains(&needle)
        })
        .filter(|e| category.map_or(true, |c| &e.category == c))
        .cloned()
        .collect();
    newest_first(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{Clock, FixedClock};
    use crate::domain::{ExpenseInput, GoalInput};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(amount: f64, category: ExpenseCategory, date: NaiveDate) -> Expense {
        Expense::new(ExpenseInput::new(amount, category, date), "u1")
    }

    #[test]
    fn category_ties_keep_first_appearance() {
        let expenses = vec![
            expense(100.0, ExpenseCategory::Travel, day(2025, 1, 2)),
            expense(300.0, ExpenseCategory::Food, day(2025, 1, 3)),
            expense(100.0, ExpenseCategory::Bills, day(2025, 1, 4)),
            expense(200.0, ExpenseCategory::Travel, day(2025, 1, 5)),
        ];
        let totals = category_totals(&expenses);
        let order: Vec<_> = totals.iter().map(|t| t.category.label().to_string()).collect();
        assert_eq!(order, ["Travel", "Food", "Bills"]);
        assert_eq!(totals[0].total, 300.0);
    }

    #[test]
    fn previous_month_wraps_into_december() {
        let expenses = vec![
            expense(500.0, ExpenseCategory::Food, day(2024, 12, 20)),
            expense(50.0, ExpenseCategory::Food, day(2025, 1, 2)),
        ];
        let now = FixedClock::at_date(2025, 1, 10).now();
        assert_eq!(previous_month_total(&expenses, now), 500.0);
        assert_eq!(current_month_total(&expenses, now), 50.0);
    }

    #[test]
    fn last_n_months_keeps_latest() {
        let expenses: Vec<_> = (1..=8)
            .map(|m| expense(m as f64, ExpenseCategory::Food, day(2024, m, 1)))
            .collect();
        let months = last_n_months(&expenses, 6);
        assert_eq!(months.len(), 6);
        assert_eq!(months[0].label, "Mar 24");
        assert_eq!(months[5].total, 8.0);
    }

    #[test]
    fn weekly_buckets_start_on_monday() {
        let expenses = vec![
            expense(10.0, ExpenseCategory::Food, day(2025, 3, 3)),
            expense(20.0, ExpenseCategory::Food, day(2025, 3, 9)),
            expense(5.0, ExpenseCategory::Food, day(2025, 3, 10)),
        ];
        let weeks = weekly_totals(&expenses);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, day(2025, 3, 3));
        assert_eq!(weeks[0].total, 30.0);
    }

    #[test]
    fn stats_are_zero_without_expenses() {
        assert_eq!(transaction_stats(&[]), TransactionStats::default());
    }

    #[test]
    fn savings_rate_requires_income() {
        assert_eq!(savings_rate(0.0, 100.0), None);
        assert_eq!(savings_rate(100.0, 100.0), Some(0.0));
        assert_eq!(savings_rate(5000.0, 6000.0), Some(-20.0));
    }

    #[test]
    fn goal_progress_daily_need_and_status() {
        let now = FixedClock::at_date(2025, 6, 1).now();
        let mut goal = Goal::new(GoalInput::new("Bike", 1000.0, day(2025, 6, 11)), "u1");
        goal.current_amount = 250.0;
        let progress = goal_progress(&goal, now);
        assert_eq!(progress.days_left, 10);
        assert_eq!(progress.daily_amount_needed, 75.0);
        assert_eq!(progress.progress_pct, 25.0);
        assert_eq!(progress.status, GoalStatus::InProgress);

        goal.deadline = day(2025, 5, 1);
        let late = goal_progress(&goal, now);
        assert_eq!(late.status, GoalStatus::DeadlinePassed);
        assert_eq!(late.daily_amount_needed, 0.0);
    }

    #[test]
    fn filter_matches_description_or_category() {
        let expenses = vec![
            expense(10.0, ExpenseCategory::Food, day(2025, 1, 1)),
            Expense::new(
                ExpenseInput::new(20.0, ExpenseCategory::Bills, day(2025, 1, 5))
                    .with_description("Electricity"),
                "u1",
            ),
        ];
        let hits = filter_expenses(&expenses, "ELEC", None);
        assert_eq!(hits.len(), 1);
        let by_category = filter_expenses(&expenses, "foo", None);
        assert_eq!(by_category[0].category, ExpenseCategory::Food);
        let all = filter_expenses(&expenses, "", Some(&ExpenseCategory::Bills));
        assert_eq!(all.len(), 1);
        assert_eq!(recent_expenses(&expenses, 5)[0].amount, 20.0);
    }
}
