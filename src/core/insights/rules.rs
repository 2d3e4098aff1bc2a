use chrono::{DateTime, Utc};

use crate::core::analytics::{
    category_totals, current_month_total, previous_month_total, savings_rate, transaction_stats,
    CategoryTotal, TransactionStats,
};
use crate::core::format::{currency, currency_rounded, fixed1, round_half_up, share_pct};
use crate::core::time::days_until;
use crate::domain::{Expense, Goal};

use super::{validate, Insight, InsightKind, InsightResult};

const CONCENTRATION_THRESHOLD_PCT: f64 = 40.0;
const TARGET_SAVINGS_PCT: f64 = 20.0;
const GOAL_INCOME_SHARE: f64 = 0.3;
const PATTERN_MIN_TRANSACTIONS: usize = 5;

/// Aggregates computed once and shared by every rule.
struct RuleContext<'a> {
    goals: &'a [Goal],
    income: f64,
    now: DateTime<Utc>,
    categories: Vec<CategoryTotal>,
    this_month: f64,
    last_month: f64,
    stats: TransactionStats,
}

type Rule = fn(&RuleContext<'_>) -> InsightResult<Option<Insight>>;

const RULES: [Rule; 5] = [
    month_over_month,
    category_concentration,
    savings_rate_rule,
    goals_at_risk,
    spending_pattern,
];

pub(super) fn evaluate(
    expenses: &[Expense],
    income: f64,
    goals: &[Goal],
    now: DateTime<Utc>,
) -> InsightResult<Vec<Insight>> {
    if expenses.is_empty() {
        return Ok(Vec::new());
    }
    validate(expenses, income, goals)?;

    let ctx = RuleContext {
        goals,
        income,
        now,
        categories: category_totals(expenses),
        this_month: current_month_total(expenses, now),
        last_month: previous_month_total(expenses, now),
        stats: transaction_stats(expenses),
    };

    let mut insights = Vec::new();
    for rule in RULES {
        if let Some(insight) = rule(&ctx)? {
            insights.push(insight);
        }
    }
    Ok(insights)
}

fn month_over_month(ctx: &RuleContext<'_>) -> InsightResult<Option<Insight>> {
    let (current, previous) = (ctx.this_month, ctx.last_month);
    if previous <= 0.0 || current == previous {
        return Ok(None);
    }
    if current > previous {
        let increase = (current - previous) / previous * 100.0;
        let narrative = format!(
            "Your spending this month ({}) is {}% higher than last month ({}). This indicates an upward trend in your expenses that may impact your savings goals.",
            currency(current),
            fixed1(increase),
            currency(previous)
        );
        let recommendation = format!(
            "To bring your spending back to last month's level, try reducing expenses by {} over the remaining days. Focus on non-essential categories.",
            currency(current - previous)
        );
        return Ok(Some(
            Insight::new(InsightKind::Warning, "Increased Spending Detected", narrative)
                .with_recommendation(recommendation),
        ));
    }
    let decrease = (previous - current) / previous * 100.0;
    let narrative = format!(
        "Excellent work! Your spending this month is {}% lower than last month. You've saved approximately {} compared to your previous spending pattern.",
        fixed1(decrease),
        currency(previous - current)
    );
    Ok(Some(
        Insight::new(InsightKind::Success, "Great Spending Control!", narrative).with_recommendation(
            "Consider allocating the saved amount to your savings goals or emergency fund to maximize the benefit of your improved spending habits.",
        ),
    ))
}

fn category_concentration(ctx: &RuleContext<'_>) -> InsightResult<Option<Insight>> {
    let Some(top) = ctx.categories.first() else {
        return Ok(None);
    };
    let total: f64 = ctx.categories.iter().map(|c| c.total).sum();
    let top_pct = share_pct(top.total, total);
    let name = top.category.label();

    if top_pct > CONCENTRATION_THRESHOLD_PCT {
        let narrative = format!(
            "{name} accounts for {pct}% of your total spending ({amount}). This high concentration in a single category may indicate an area where cost optimization is possible.\n\nBreaking down further:\n- Amount spent: {amount}\n- Percentage of total: {pct}%\n- Compared to other categories, this is significantly higher",
            pct = fixed1(top_pct),
            amount = currency(top.total),
        );
        let recommendation = format!(
            "Review your {name} expenses in detail. Look for subscriptions you can cancel, cheaper alternatives, or ways to reduce frequency. Even a 20% reduction could save you {}.",
            currency_rounded(top.total * 0.2)
        );
        return Ok(Some(
            Insight::new(
                InsightKind::Warning,
                format!("High Concentration in {name}"),
                narrative,
            )
            .with_recommendation(recommendation),
        ));
    }

    let breakdown = ctx
        .categories
        .iter()
        .take(3)
        .enumerate()
        .map(|(idx, cat)| {
            format!(
                "{}. {}: {} ({}%)",
                idx + 1,
                cat.category.label(),
                currency(cat.total),
                fixed1(share_pct(cat.total, total))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let narrative = format!(
        "Your spending is well-distributed across categories, with {name} being your highest at {}%. This balanced approach indicates healthy financial management.\n\nTop 3 categories:\n{breakdown}",
        fixed1(top_pct)
    );
    Ok(Some(
        Insight::new(
            InsightKind::Success,
            "Well-Balanced Spending Distribution",
            narrative,
        )
        .with_recommendation(
            "Maintain this balanced approach while looking for small optimizations in each category. Consider setting specific budgets for your top 3 categories.",
        ),
    ))
}

fn savings_rate_rule(ctx: &RuleContext<'_>) -> InsightResult<Option<Insight>> {
    let Some(rate) = savings_rate(ctx.income, ctx.this_month) else {
        return Ok(None);
    };
    let income = ctx.income;
    let spent = ctx.this_month;
    let remaining = income - spent;

    if rate >= TARGET_SAVINGS_PCT {
        let narrative = format!(
            "Your current savings rate is {rate}%, which exceeds the recommended 20% savings target. You're saving {saved} this month.\n\nFinancial health indicators:\n- Monthly income: {income}\n- Monthly expenses: {spent}\n- Savings: {saved}\n- Savings rate: {rate}%",
            rate = fixed1(rate),
            saved = currency(remaining),
            income = currency(income),
            spent = currency(spent),
        );
        return Ok(Some(
            Insight::new(InsightKind::Success, "Healthy Savings Rate Achieved!", narrative)
                .with_recommendation(
                    "Consider diversifying your savings into different instruments - emergency fund (3-6 months expenses), short-term goals, and long-term investments like SIPs or PPF.",
                ),
        ));
    }

    if rate > 0.0 {
        let narrative = format!(
            "Your current savings rate is {rate}%, which is below the recommended 20% target. To reach the ideal savings rate, you'd need to save an additional {gap} per month.\n\nCurrent breakdown:\n- Monthly income: {income}\n- Monthly expenses: {spent}\n- Current savings: {saved}\n- Target savings (20%): {target}",
            rate = fixed1(rate),
            gap = currency_rounded(income * 0.2 - remaining),
            income = currency(income),
            spent = currency(spent),
            saved = currency(remaining),
            target = currency_rounded(income * 0.2),
        );
        let recommendation = format!(
            "Try the 50-30-20 budgeting rule: 50% for needs ({}), 30% for wants ({}), and 20% for savings ({}).",
            currency_rounded(income * 0.5),
            currency_rounded(income * 0.3),
            currency_rounded(income * 0.2)
        );
        return Ok(Some(
            Insight::new(InsightKind::Tip, "Room for Savings Improvement", narrative)
                .with_recommendation(recommendation),
        ));
    }

    if remaining < 0.0 {
        let overspend = currency(remaining.abs());
        let narrative = format!(
            "Critical alert: Your expenses ({}) exceed your income ({}) by {overspend}. This unsustainable pattern can lead to debt accumulation.\n\nUrgent action required:\n- Overspending amount: {overspend}\n- Percentage over budget: {}%",
            currency(spent),
            currency(income),
            fixed1(rate.abs()),
        );
        return Ok(Some(
            Insight::new(InsightKind::Warning, "Spending Exceeds Income!", narrative)
                .with_recommendation(
                    "Immediately identify non-essential expenses to cut. Prioritize bills and essentials first. Consider finding additional income sources or using the expense tracker to monitor daily spending.",
                ),
        ));
    }

    Ok(None)
}

fn goals_at_risk(ctx: &RuleContext<'_>) -> InsightResult<Option<Insight>> {
    if ctx.income <= 0.0 {
        return Ok(None);
    }
    let at_risk: Vec<String> = ctx
        .goals
        .iter()
        .filter_map(|goal| {
            let days_left = days_until(goal.deadline, ctx.now);
            let amount_needed = goal.target_amount - goal.current_amount;
            let daily = amount_needed / days_left.max(1) as f64;
            let risky = daily * 30.0 > ctx.income * GOAL_INCOME_SHARE && days_left > 0;
            risky.then(|| {
                format!(
                    "- {}: {} needed in {} days (₹{}/day)",
                    goal.name,
                    currency(amount_needed),
                    days_left,
                    round_half_up(daily)
                )
            })
        })
        .collect();

    if at_risk.is_empty() {
        return Ok(None);
    }
    let narrative = format!(
        "{} of your savings goals may be difficult to achieve with current spending patterns:\n\n{}",
        at_risk.len(),
        at_risk.join("\n")
    );
    Ok(Some(
        Insight::new(InsightKind::Warning, "Savings Goals at Risk", narrative).with_recommendation(
            "Consider extending deadlines, increasing monthly contributions, or temporarily pausing non-essential expenses to fast-track these goals.",
        ),
    ))
}

fn spending_pattern(ctx: &RuleContext<'_>) -> InsightResult<Option<Insight>> {
    let stats = ctx.stats;
    if stats.count < PATTERN_MIN_TRANSACTIONS {
        return Ok(None);
    }
    let average = currency_rounded(stats.average);
    let narrative = format!(
        "Based on your {count} transactions, your average transaction size is {average}. Understanding your typical transaction size can help identify unusual expenses.\n\nPattern details:\n- Total transactions: {count}\n- Average transaction: {average}\n- Largest expense: {max}\n- Smallest expense: {min}",
        count = stats.count,
        max = currency(stats.max),
        min = currency(stats.min),
    );
    let recommendation = format!(
        "Set a mental 'pause threshold' at 2x your average ({}). For any purchase above this, take 24 hours to decide if it's truly necessary.",
        currency_rounded(stats.average * 2.0)
    );
    Ok(Some(
        Insight::new(InsightKind::Tip, "Spending Pattern Analysis", narrative)
            .with_recommendation(recommendation),
    ))
}
