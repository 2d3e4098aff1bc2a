mod common;

use common::{clock_on, date};
use paisapal_core::core::analytics::{
    category_totals, goal_progress, last_n_months, monthly_totals, savings_rate, GoalStatus,
};
use paisapal_core::core::insights::generate_monthly_insights;
use paisapal_core::core::time::Clock;
use paisapal_core::domain::{Expense, ExpenseCategory, ExpenseInput, Goal, GoalInput};

fn sample() -> Vec<Expense> {
    let rows = [
        (120.0, ExpenseCategory::Food, date(2025, 1, 4)),
        (80.0, ExpenseCategory::Travel, date(2025, 1, 9)),
        (300.0, ExpenseCategory::Bills, date(2025, 2, 1)),
        (80.0, ExpenseCategory::Health, date(2025, 2, 14)),
        (45.5, ExpenseCategory::Food, date(2025, 3, 2)),
        (999.0, ExpenseCategory::from_label("Pets"), date(2024, 12, 30)),
    ];
    rows.into_iter()
        .map(|(amount, category, day)| Expense::new(ExpenseInput::new(amount, category, day), "u1"))
        .collect()
}

#[test]
fn category_totals_conserve_the_sum() {
    let expenses = sample();
    let totals = category_totals(&expenses);
    let by_category: f64 = totals.iter().map(|t| t.total).sum();
    let raw: f64 = expenses.iter().map(|e| e.amount).sum();
    assert!((by_category - raw).abs() < 1e-9);
}

#[test]
fn category_totals_sort_descending_with_stable_ties() {
    let totals = category_totals(&sample());
    assert!(totals.windows(2).all(|w| w[0].total >= w[1].total));
    // Travel (80) was seen before Health (80)
    let tied: Vec<_> = totals
        .iter()
        .filter(|t| t.total == 80.0)
        .map(|t| t.category.label())
        .collect();
    assert_eq!(tied, ["Travel", "Health"]);
}

#[test]
fn monthly_totals_ignore_input_order() {
    let expenses = sample();
    let mut reversed = expenses.clone();
    reversed.reverse();
    let first = monthly_totals(&expenses);
    assert_eq!(first, monthly_totals(&reversed));
    assert_eq!(first, monthly_totals(&expenses));
    let labels: Vec<_> = first.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["Dec 24", "Jan 25", "Feb 25", "Mar 25"]);
    assert_eq!(last_n_months(&expenses, 2).len(), 2);
}

#[test]
fn savings_rate_sentinels() {
    assert_eq!(savings_rate(0.0, 500.0), None);
    assert_eq!(savings_rate(100.0, 100.0), Some(0.0));
}

#[test]
fn overfunded_goal_is_complete_even_after_deadline() {
    let now = clock_on(date(2025, 6, 1)).now();
    let mut goal = Goal::new(GoalInput::new("Phone", 1_000.0, date(2025, 5, 1)), "u1");
    goal.record_contribution(1_200.0, date(2025, 4, 20));
    let progress = goal_progress(&goal, now);
    assert!(progress.ratio >= 1.0);
    assert!(progress.completed);
    assert!(progress.days_left < 0);
    assert_eq!(progress.status, GoalStatus::Completed);
    assert_eq!(progress.progress_pct, 100.0);
}

#[test]
fn single_month_yields_one_first_month_entry() {
    let expenses = vec![Expense::new(
        ExpenseInput::new(250.0, ExpenseCategory::Food, date(2025, 3, 1)),
        "u1",
    )];
    let months = monthly_totals(&expenses);
    let insights = generate_monthly_insights(&months, &category_totals(&expenses), 0.0);
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, "First Month");
}
