mod common;

use chrono::{DateTime, Utc};
use common::{clock_on, date};
use paisapal_core::core::analytics::{category_totals, current_month_expenses, savings_rate};
use paisapal_core::core::insights::{generate_insights, InsightKind};
use paisapal_core::core::time::Clock;
use paisapal_core::domain::{Expense, ExpenseCategory, ExpenseInput, Goal, GoalInput};

fn now() -> DateTime<Utc> {
    clock_on(date(2025, 3, 10)).now()
}

fn food(amount: f64, day: u32) -> Expense {
    Expense::new(
        ExpenseInput::new(amount, ExpenseCategory::Food, date(2025, 3, day)),
        "u1",
    )
}

#[test]
fn concentrated_spending_with_healthy_savings() {
    let expenses = vec![food(1_000.0, 2), food(4_000.0, 5)];
    let month = current_month_expenses(&expenses, now());
    let totals = category_totals(&month);
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].category, ExpenseCategory::Food);
    assert_eq!(totals[0].total, 5_000.0);
    assert_eq!(savings_rate(10_000.0, 5_000.0), Some(50.0));

    let insights = generate_insights(&expenses, 10_000.0, &[], now());
    let summary: Vec<_> = insights
        .iter()
        .map(|i| (i.kind, i.title.as_str()))
        .collect();
    assert_eq!(
        summary,
        [
            (InsightKind::Warning, "High Concentration in Food"),
            (InsightKind::Success, "Healthy Savings Rate Achieved!"),
        ]
    );
    insta::assert_snapshot!(
        insights[0].recommendation.clone().unwrap_or_default(),
        @"Review your Food expenses in detail. Look for subscriptions you can cancel, cheaper alternatives, or ways to reduce frequency. Even a 20% reduction could save you ₹1,000."
    );
    assert!(insights[1].narrative.starts_with("Your current savings rate is 50.0%"));
}

#[test]
fn goal_needing_more_than_a_third_of_income_is_at_risk() {
    let expenses = vec![food(100.0, 3)];
    let goal = Goal::new(GoalInput::new("Bike", 12_000.0, date(2025, 4, 9)), "u1");
    let insights = generate_insights(&expenses, 1_000.0, &[goal], now());
    let risk = insights
        .iter()
        .find(|i| i.title == "Savings Goals at Risk")
        .expect("goal flagged");
    assert_eq!(risk.kind, InsightKind::Warning);
    assert!(risk
        .narrative
        .contains("- Bike: ₹12,000 needed in 30 days (₹400/day)"));
}

#[test]
fn overspending_raises_critical_alert() {
    let expenses = vec![food(6_000.0, 4)];
    assert_eq!(savings_rate(5_000.0, 6_000.0), Some(-20.0));
    let insights = generate_insights(&expenses, 5_000.0, &[], now());
    let alert = insights
        .iter()
        .find(|i| i.title == "Spending Exceeds Income!")
        .expect("overspend alert");
    assert_eq!(alert.kind, InsightKind::Warning);
    assert!(alert.narrative.contains("exceed your income (₹5,000) by ₹1,000"));
    assert!(alert.narrative.contains("Percentage over budget: 20.0%"));
}

#[test]
fn no_expenses_means_no_insights() {
    let goal = Goal::new(GoalInput::new("Bike", 12_000.0, date(2025, 4, 9)), "u1");
    assert!(generate_insights(&[], 50_000.0, &[goal], now()).is_empty());
}

#[test]
fn bad_input_yields_the_fallback_entry() {
    let mut broken = food(100.0, 1);
    broken.amount = f64::NAN;
    let insights = generate_insights(&[broken], 10_000.0, &[], now());
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].kind, InsightKind::Info);
    assert_eq!(insights[0].title, "Insights Unavailable");
}
