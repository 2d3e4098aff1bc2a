//! Dashboard figures, report metrics and the plain-text report document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::analytics::{
    category_totals, current_month_expenses, current_month_total, goal_totals, month_total,
    monthly_totals, previous_month_total, recent_expenses, savings_rate, transaction_stats,
    CategoryTotal, FinanceSnapshot, GoalTotals,
};
use crate::core::format::{currency, currency_rounded, fixed1, share_pct, signed_percent};
use crate::domain::{Expense, ExpenseCategory, YearMonth};

pub const RECENT_EXPENSE_COUNT: usize = 5;

/// Headline numbers for the home screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_spent: f64,
    pub this_month: f64,
    /// Income minus this month's spending; `None` while income is unset.
    pub balance: Option<f64>,
    pub goals: GoalTotals,
    pub unlocked_achievements: usize,
    pub total_achievements: usize,
    pub recent: Vec<Expense>,
    pub month_categories: Vec<CategoryTotal>,
}

pub fn dashboard_summary(snapshot: &FinanceSnapshot<'_>, now: DateTime<Utc>) -> DashboardSummary {
    let this_month = current_month_total(snapshot.expenses, now);
    DashboardSummary {
        total_spent: snapshot.expenses.iter().map(|e| e.amount).sum(),
        this_month,
        balance: (snapshot.income > 0.0).then(|| snapshot.income - this_month),
        goals: goal_totals(snapshot.goals),
        unlocked_achievements: snapshot.unlocked_count(),
        total_achievements: snapshot.achievements.len(),
        recent: recent_expenses(snapshot.expenses, RECENT_EXPENSE_COUNT),
        month_categories: category_totals(&current_month_expenses(snapshot.expenses, now)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub percentage: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub label: String,
    pub expenses: f64,
    /// Income left over, floored at zero.
    pub savings: f64,
    pub income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMetrics {
    pub this_month: f64,
    pub last_month: f64,
    /// Month-over-month change in percent; 0 without a previous month.
    pub monthly_change: f64,
    /// 0 while income is unset.
    pub savings_rate: f64,
    pub income: f64,
    pub total_goals: usize,
    pub completed_goals: usize,
    pub total_saved: f64,
    pub transactions: usize,
    pub average_transaction: f64,
    pub categories: Vec<CategoryReport>,
    pub months: Vec<MonthlyReport>,
}

fn category_trend(expenses: &[Expense], category: &ExpenseCategory, now: DateTime<Utc>) -> Trend {
    let month = YearMonth::of(now.date_naive());
    let in_category: Vec<Expense> = expenses
        .iter()
        .filter(|e| &e.category == category)
        .cloned()
        .collect();
    let current = month_total(&in_category, month);
    let previous = month_total(&in_category, month.previous());
    if current > previous {
        Trend::Up
    } else if current < previous {
        Trend::Down
    } else {
        Trend::Stable
    }
}

pub fn financial_metrics(snapshot: &FinanceSnapshot<'_>, now: DateTime<Utc>) -> FinancialMetrics {
    let expenses = snapshot.expenses;
    let income = snapshot.income;
    let this_month = current_month_total(expenses, now);
    let last_month = previous_month_total(expenses, now);
    let monthly_change = if last_month > 0.0 {
        (this_month - last_month) / last_month * 100.0
    } else {
        0.0
    };

    let totals = category_totals(expenses);
    let all_time: f64 = totals.iter().map(|t| t.total).sum();
    let categories = totals
        .iter()
        .map(|t| CategoryReport {
            category: t.category.clone(),
            amount: t.total,
            percentage: share_pct(t.total, all_time),
            trend: category_trend(expenses, &t.category, now),
        })
        .collect();

    let months = monthly_totals(expenses)
        .into_iter()
        .map(|m| MonthlyReport {
            label: m.label,
            expenses: m.total,
            savings: (income - m.total).max(0.0),
            income,
        })
        .collect();

    let goals = goal_totals(snapshot.goals);
    let stats = transaction_stats(expenses);
    FinancialMetrics {
        this_month,
        last_month,
        monthly_change,
        savings_rate: savings_rate(income, this_month).unwrap_or(0.0),
        income,
        total_goals: goals.count,
        completed_goals: goals.completed,
        total_saved: goals.saved,
        transactions: stats.count,
        average_transaction: stats.average,
        categories,
        months,
    }
}

/// The downloadable plain-text report.
pub fn render_text_report(snapshot: &FinanceSnapshot<'_>, now: DateTime<Utc>) -> String {
    let m = financial_metrics(snapshot, now);
    let breakdown = m
        .categories
        .iter()
        .map(|c| {
            format!(
                "{}: {} ({}%)",
                c.category,
                currency(c.amount),
                fixed1(c.percentage)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let top = m
        .categories
        .first()
        .map(|c| c.category.label().to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "PAISAPAL - FINANCIAL REPORT
Generated: {generated}

MONTHLY SUMMARY
===============
Current Month Expenses: {this_month}
Last Month Expenses: {last_month}
Change: {change}

Monthly Income: {income}
Savings Rate: {rate}%

FINANCIAL GOALS
===============
Total Goals: {goals}
Completed Goals: {completed}
Total Saved: {saved}

EXPENSE BREAKDOWN
=================
{breakdown}

KEY METRICS
===========
Total Transactions: {count}
Average Transaction: {average}
Highest Spending Category: {top}
",
        generated = now.format("%Y-%m-%d"),
        this_month = currency(m.this_month),
        last_month = currency(m.last_month),
        change = signed_percent(m.monthly_change),
        income = currency(m.income),
        rate = fixed1(m.savings_rate),
        goals = m.total_goals,
        completed = m.completed_goals,
        saved = currency(m.total_saved),
        count = m.transactions,
        average = currency_rounded(m.average_transaction),
    )
}

/// File name for a report generated at `now`.
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("paisapal-report-{}.txt", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{Clock, FixedClock};
    use crate::domain::{achievement_catalog, ExpenseInput, Goal, GoalInput};
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn spend(amount: f64, category: ExpenseCategory, date: NaiveDate) -> Expense {
        Expense::new(ExpenseInput::new(amount, category, date), "u")
    }

    #[test]
    fn metrics_trend_is_deterministic() {
        let now = FixedClock::at_date(2025, 4, 15).now();
        let expenses = vec![
            spend(200.0, ExpenseCategory::Food, day(3, 2)),
            spend(500.0, ExpenseCategory::Food, day(4, 2)),
            spend(300.0, ExpenseCategory::Travel, day(3, 5)),
            spend(100.0, ExpenseCategory::Travel, day(4, 5)),
        ];
        let snap = FinanceSnapshot::new(&expenses, &[], &[], 1000.0);
        let metrics = financial_metrics(&snap, now);
        assert_eq!(metrics.categories[0].category, ExpenseCategory::Food);
        assert_eq!(metrics.categories[0].trend, Trend::Up);
        assert_eq!(metrics.categories[1].trend, Trend::Down);
        assert_eq!(metrics.monthly_change, 20.0);
        assert_eq!(metrics.savings_rate, 40.0);
        assert_eq!(metrics.months[1].savings, 400.0);
    }

    #[test]
    fn summary_without_income_has_no_balance() {
        let now = FixedClock::at_date(2025, 4, 15).now();
        let expenses: Vec<_> = (1..=7)
            .map(|d| spend(d as f64, ExpenseCategory::Bills, day(4, d)))
            .collect();
        let badges = achievement_catalog("u");
        let snap = FinanceSnapshot::new(&expenses, &[], &badges, 0.0);
        let summary = dashboard_summary(&snap, now);
        assert_eq!(summary.balance, None);
        assert_eq!(summary.recent.len(), RECENT_EXPENSE_COUNT);
        assert_eq!(summary.recent[0].amount, 7.0);
        assert_eq!(summary.total_achievements, 6);
        assert_eq!(summary.unlocked_achievements, 0);
    }

    #[test]
    fn text_report_sections() {
        let now = FixedClock::at_date(2025, 4, 15).now();
        let expenses = vec![spend(1200.0, ExpenseCategory::Shopping, day(4, 1))];
        let mut goal = Goal::new(GoalInput::new("Fund", 500.0, day(12, 1)), "u");
        goal.current_amount = 500.0;
        let goals = vec![goal];
        let snap = FinanceSnapshot::new(&expenses, &goals, &[], 0.0);
        let text = render_text_report(&snap, now);
        assert!(text.starts_with("PAISAPAL - FINANCIAL REPORT\nGenerated: 2025-04-15"));
        assert!(text.contains("Change: 0.0%"));
        assert!(text.contains("Completed Goals: 1"));
        assert!(text.contains("Shopping: ₹1,200 (100.0%)"));
        assert!(text.contains("Highest Spending Category: Shopping"));
    }
}
