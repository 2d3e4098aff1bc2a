//! Keyword-routed answers to common finance questions and the health score.
//!
//! The advisor never calls out to a model: each intent renders a fixed
//! template from the same aggregates the insight engine uses.

use chrono::{DateTime, Utc};

use crate::core::analytics::{
    category_totals, current_month_expenses, goal_progress, goal_totals, transaction_stats,
    CategoryTotal, FinanceSnapshot, GoalStatus,
};
use crate::core::format::{currency, currency_rounded, fixed1, round_half_up, share_pct};
use crate::domain::{Expense, Goal};

pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "How much did I spend this month?",
    "What's my biggest expense category?",
    "Am I on track with my savings goals?",
    "Give me tips to save more money",
    "Analyze my spending patterns",
    "How can I improve my financial health?",
];

const RANKED_CATEGORIES: usize = 5;

/// Topic a question is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorIntent {
    MonthlySpending,
    TopCategory,
    Goals,
    SavingTips,
    PatternAnalysis,
    FinancialHealth,
    Overview,
}

impl AdvisorIntent {
    /// First matching keyword group wins.
    pub fn detect(question: &str) -> Self {
        let lower = question.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
        if has(&["spent this month", "monthly spending"]) {
            AdvisorIntent::MonthlySpending
        } else if has(&["biggest expense", "top category", "spending category"]) {
            AdvisorIntent::TopCategory
        } else if has(&["savings goal", "goal", "on track"]) {
            AdvisorIntent::Goals
        } else if has(&["tips", "save more", "advice"]) {
            AdvisorIntent::SavingTips
        } else if has(&["pattern", "analyze", "analysis"]) {
            AdvisorIntent::PatternAnalysis
        } else if has(&["financial health", "improve", "better"]) {
            AdvisorIntent::FinancialHealth
        } else {
            AdvisorIntent::Overview
        }
    }
}

/// Everything the advisor needs to answer.
#[derive(Debug, Clone, Copy)]
pub struct AdvisorContext<'a> {
    pub user_name: Option<&'a str>,
    pub snapshot: FinanceSnapshot<'a>,
    pub now: DateTime<Utc>,
}

/// Aggregates shared across the intent templates.
struct Figures {
    this_month: f64,
    month_categories: Vec<CategoryTotal>,
    total: f64,
    ranked: Vec<CategoryTotal>,
    savings_rate: f64,
    balance: f64,
    goals_pct: f64,
    goals_saved: f64,
    goals_target: f64,
}

impl Figures {
    fn collect(ctx: &AdvisorContext<'_>) -> Self {
        let snap = ctx.snapshot;
        let month = current_month_expenses(snap.expenses, ctx.now);
        let this_month: f64 = month.iter().map(|e| e.amount).sum();
        let mut ranked = category_totals(snap.expenses);
        ranked.truncate(RANKED_CATEGORIES);
        let totals = goal_totals(snap.goals);
        Self {
            this_month,
            month_categories: category_totals(&month),
            total: snap.expenses.iter().map(|e| e.amount).sum(),
            ranked,
            savings_rate: share_pct(snap.income - this_month, snap.income),
            balance: snap.income - this_month,
            goals_pct: totals.overall_pct,
            goals_saved: totals.saved,
            goals_target: totals.target,
        }
    }
}

/// Answers `question` from the user's current records.
pub fn respond(question: &str, ctx: &AdvisorContext<'_>) -> String {
    let intent = AdvisorIntent::detect(question);
    tracing::debug!(?intent, "advisor routed question");
    let figures = Figures::collect(ctx);
    match intent {
        AdvisorIntent::MonthlySpending => monthly_spending(ctx, &figures),
        AdvisorIntent::TopCategory => top_category(&figures),
        AdvisorIntent::Goals => goals_status(ctx, &figures),
        AdvisorIntent::SavingTips => saving_tips(ctx, &figures),
        AdvisorIntent::PatternAnalysis => pattern_analysis(ctx, &figures),
        AdvisorIntent::FinancialHealth => health_report(ctx, &figures),
        AdvisorIntent::Overview => overview(ctx, &figures),
    }
}

fn monthly_spending(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let income = ctx.snapshot.income;
    let income_block = if income > 0.0 {
        format!(
            "**Monthly Income:** {}\n**Remaining Balance:** {}\n**Savings Rate:** {}%",
            currency(income),
            currency(f.balance),
            fixed1(f.savings_rate)
        )
    } else {
        "💡 *Tip: Set your monthly income in Profile to get better insights!*".to_string()
    };
    let breakdown = if f.month_categories.is_empty() {
        "No expenses recorded this month yet.".to_string()
    } else {
        f.month_categories
            .iter()
            .take(RANKED_CATEGORIES)
            .map(|c| {
                format!(
                    "• {}: {} ({}%)",
                    c.category,
                    currency(c.total),
                    fixed1(share_pct(c.total, f.this_month))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let analysis = if f.this_month == 0.0 {
        "You haven't recorded any expenses this month. Start tracking to get personalized insights!".to_string()
    } else if income > 0.0 && f.savings_rate >= 20.0 {
        "Excellent! You're maintaining a healthy savings rate above 20%. Keep up the great financial discipline!".to_string()
    } else if income > 0.0 && f.savings_rate > 0.0 {
        format!(
            "You're saving {}% of your income. The recommended savings rate is 20%. Consider reducing expenses in your top spending categories.",
            fixed1(f.savings_rate)
        )
    } else if income > 0.0 {
        "⚠️ Warning: Your expenses are exceeding your income. This is unsustainable. Review your spending and identify non-essential expenses to cut.".to_string()
    } else {
        "Good job tracking your expenses! Set your income to get a complete financial picture.".to_string()
    };
    format!(
        "📊 **Your Monthly Spending Analysis**\n\n**Total Spent This Month:** {}\n\n{}\n\n**Breakdown by Category:**\n{}\n\n**My Analysis:**\n{}",
        currency(f.this_month),
        income_block,
        breakdown,
        analysis
    )
}

fn top_category(f: &Figures) -> String {
    let Some(top) = f.ranked.first() else {
        return "You haven't recorded any expenses yet. Start tracking your spending to see which categories consume most of your budget!".to_string();
    };
    let top_pct = share_pct(top.total, f.total);
    let name = top.category.label();
    let ranking = f
        .ranked
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            format!(
                "{}. **{}**: {} ({}%)",
                idx + 1,
                c.category,
                currency(c.total),
                fixed1(share_pct(c.total, f.total))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let analysis = if top_pct > 40.0 {
        format!(
            "Your {name} spending is quite high at {pct}% of total expenses. Here are some suggestions:\n\n• Review individual {name} transactions for unnecessary spending\n• Set a specific budget limit for {name}\n• Look for alternatives or discounts\n• Track {name} expenses more closely for a week",
            pct = fixed1(top_pct)
        )
    } else {
        format!(
            "Your spending is well-distributed across categories. {name} leads at {}%, which is reasonable. Consider setting category-specific budgets to maintain this balance.",
            fixed1(top_pct)
        )
    };
    format!(
        "🎯 **Your Top Spending Categories**\n\n**#1 {name}:** {} ({}% of total)\n\n**Full Category Ranking:**\n{ranking}\n\n**My Analysis:**\n{analysis}",
        currency(top.total),
        fixed1(top_pct)
    )
}

fn goal_line(goal: &Goal, now: DateTime<Utc>) -> String {
    let progress = goal_progress(goal, now);
    let pct = progress.ratio * 100.0;
    let status = match progress.status {
        GoalStatus::Completed => "✅ Completed",
        _ if progress.days_left < 0 => "⚠️ Overdue",
        _ if pct >= 75.0 => "🔥 Almost there",
        _ => "📈 In progress",
    };
    let timing = match progress.days_left {
        d if d > 0 => format!("Days left: {d}"),
        0 => "Due today!".to_string(),
        d => format!("Overdue by {} days", d.abs()),
    };
    let mut line = format!(
        "**{}** {}\n   • Progress: {}% ({} / {})\n   • {}",
        goal.name,
        status,
        fixed1(pct),
        currency(goal.current_amount),
        currency(goal.target_amount),
        timing
    );
    if !progress.completed && progress.days_left > 0 {
        line.push_str(&format!(
            "\n   • Daily savings needed: {}",
            currency(progress.daily_amount_needed)
        ));
    }
    line
}

fn goals_status(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let goals = ctx.snapshot.goals;
    if goals.is_empty() {
        return "🎯 **Savings Goals Status**\n\nYou don't have any savings goals set up yet!\n\n**Why Set Savings Goals?**\n• Gives your money a purpose\n• Motivates consistent saving\n• Helps prioritize spending decisions\n• Tracks progress toward dreams\n\n**Recommended First Goals:**\n1. **Emergency Fund** - 3-6 months of expenses\n2. **Short-term Goal** - Something achievable in 3-6 months\n3. **Long-term Goal** - Major purchase or investment\n\nUse `add-goal` to create your first savings goal!".to_string();
    }
    let details = goals
        .iter()
        .map(|g| goal_line(g, ctx.now))
        .collect::<Vec<_>>()
        .join("\n\n");
    let advice = match f.goals_pct {
        p if p >= 75.0 => "Fantastic progress! You're very close to achieving your goals. Stay consistent and you'll reach them soon!",
        p if p >= 50.0 => "Good progress! You're halfway there. Consider increasing your monthly contributions to accelerate your savings.",
        p if p >= 25.0 => "You've made a start! To improve your progress, try automating a fixed savings amount each month.",
        _ => "Your savings journey has just begun. Focus on one goal at a time and make regular contributions, even if small.",
    };
    format!(
        "🎯 **Savings Goals Analysis**\n\n**Overall Progress:** {}%\n**Total Saved:** {} / {}\n\n**Your Goals:**\n{}\n\n**My Recommendations:**\n{}",
        fixed1(f.goals_pct),
        currency(f.goals_saved),
        currency(f.goals_target),
        details,
        advice
    )
}

fn saving_tips(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let income = ctx.snapshot.income;
    let first = match f.ranked.first() {
        Some(top) => format!(
            "1. **Review {} spending** - Your top category. Even 10% reduction saves {}",
            top.category,
            currency_rounded(top.total * 0.1)
        ),
        None => "1. **Start tracking expenses** - You can't improve what you don't measure".to_string(),
    };
    let monthly = if income > 0.0 {
        format!(
            "• Follow 50-30-20 rule: {} needs, {} wants, {} savings",
            currency_rounded(income * 0.5),
            currency_rounded(income * 0.3),
            currency_rounded(income * 0.2)
        )
    } else {
        "• Set your income to get personalized budget recommendations".to_string()
    };
    let mut out = format!(
        "💡 **Personalized Money-Saving Tips**\n\nBased on your financial profile, here are tailored recommendations:\n\n**Immediate Actions:**\n{first}\n2. **Apply the 24-hour rule** - Wait a day before non-essential purchases over ₹500\n3. **Use cash for discretionary spending** - Physical money makes spending feel more real\n\n**Weekly Habits:**\n• Review all subscriptions and cancel unused ones\n• Plan meals to reduce food waste and dining out\n• Compare prices before making purchases\n• Set specific \"no-spend\" days\n\n**Monthly Strategies:**\n{monthly}\n• Automate savings transfers on salary day\n• Review and adjust budgets based on actual spending\n• Track your net worth monthly\n\n**Long-term Wealth Building:**\n• Build emergency fund (3-6 months expenses)\n• Start SIP investments for long-term goals\n• Increase savings rate by 1% every quarter\n• Learn about tax-saving investments"
    );
    if income > 0.0 && f.savings_rate < 20.0 {
        out.push_str(&format!(
            "\n\n**Your Priority:** Increase savings rate from {}% to 20% by reducing spending by {}/month",
            fixed1(f.savings_rate),
            currency_rounded(income * 0.2 - f.balance)
        ));
    }
    out
}

fn count_in(expenses: &[Expense], category: &crate::domain::ExpenseCategory) -> usize {
    expenses.iter().filter(|e| &e.category == category).count()
}

fn pattern_analysis(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let expenses = ctx.snapshot.expenses;
    let stats = transaction_stats(expenses);
    let distribution = if f.ranked.is_empty() {
        "No expense data available yet.".to_string()
    } else {
        f.ranked
            .iter()
            .map(|c| {
                format!(
                    "• **{}**: {} ({} transactions)",
                    c.category,
                    currency(c.total),
                    count_in(expenses, &c.category)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let behaviour = if stats.count >= 5 {
        let mut lines = vec![
            format!(
                "• Your typical spend per transaction is around {}",
                currency_rounded(stats.average)
            ),
            format!(
                "• Transactions above {} should trigger a \"think twice\" moment",
                currency_rounded(stats.average * 2.0)
            ),
        ];
        if let Some(top) = f.ranked.first() {
            lines.push(format!(
                "• {} dominates your spending - focus optimization here",
                top.category
            ));
        }
        if stats.max > stats.average * 5.0 {
            lines.push(format!(
                "• You have some large outlier expenses ({}) - review if these were necessary",
                currency(stats.max)
            ));
        }
        lines.join("\n")
    } else {
        "Add more expenses to unlock detailed pattern analysis!".to_string()
    };
    let recommendations = if stats.count == 0 {
        "Start tracking your expenses to get personalized insights!".to_string()
    } else {
        format!(
            "1. Set a daily spending limit of {}\n2. Review transactions in your top category weekly\n3. Flag any expense above {} for review",
            currency_rounded(stats.average * 1.5),
            currency_rounded(stats.average * 3.0)
        )
    };
    format!(
        "📈 **Detailed Spending Pattern Analysis**\n\n**Transaction Statistics:**\n• Total transactions: {}\n• Average transaction: {}\n• Largest expense: {}\n• Smallest expense: {}\n• Total spent (all time): {}\n\n**Category Distribution:**\n{}\n\n**Behavioral Insights:**\n{}\n\n**Recommendations:**\n{}",
        stats.count,
        currency_rounded(stats.average),
        currency(stats.max),
        currency(stats.min),
        currency(f.total),
        distribution,
        behaviour,
        recommendations
    )
}

fn bullet_or(items: &[String], prefix: &str, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .map(|item| format!("{prefix} {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn health_report(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let snap = ctx.snapshot;
    let health = financial_health_score(snap.income, f.this_month, snap.goals, snap.expenses);
    let plan = health
        .action_plan
        .iter()
        .enumerate()
        .map(|(idx, step)| format!("{}. {}", idx + 1, step))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "🏥 **Your Financial Health Report**\n\n**Overall Health Score: {}/100** {}\n\n**Score Breakdown:**\n{}\n\n**Strengths:**\n{}\n\n**Areas for Improvement:**\n{}\n\n**Action Plan:**\n{}\n\n**Next Steps:**\n• Review your spending weekly using the `monthly` and `insights` commands\n• Set specific, measurable financial goals\n• Ask the advisor regularly for personalized advice\n• Celebrate small wins to stay motivated!",
        health.score,
        health.emoji,
        bullet_or(&health.breakdown, "•", ""),
        bullet_or(&health.strengths, "✅", "Start tracking to identify your strengths!"),
        bullet_or(
            &health.improvements,
            "⚠️",
            "Great job! Keep maintaining your current habits."
        ),
        plan
    )
}

fn overview(ctx: &AdvisorContext<'_>, f: &Figures) -> String {
    let snap = ctx.snapshot;
    let name = ctx
        .user_name
        .and_then(|n| n.split_whitespace().next())
        .unwrap_or("there");
    let income_line = if snap.income > 0.0 {
        format!(
            "• Income: {}\n• Balance: {}",
            currency(snap.income),
            currency(f.balance)
        )
    } else {
        "• Set your income in Profile for better insights".to_string()
    };
    let goals = if snap.goals.is_empty() {
        "None set yet".to_string()
    } else {
        format!(
            "{} active ({}% overall progress)",
            snap.goals.len(),
            round_half_up(f.goals_pct)
        )
    };
    let suggestion = SUGGESTED_QUESTIONS[snap.expenses.len() % SUGGESTED_QUESTIONS.len()];
    format!(
        "👋 **Hello {name}!**\n\nI'm your PaisaPal financial advisor. Here's a quick overview of your finances:\n\n**This Month:**\n• Spent: {}\n{income_line}\n\n**Goals:** {goals}\n\n**How can I help you today?**\n• Ask about your spending patterns\n• Get savings tips and advice\n• Check your goals progress\n• Analyze your financial health\n\nTry asking: \"{suggestion}\"",
        currency(f.this_month)
    )
}

/// Result of [`financial_health_score`].
#[derive(Debug, Clone, PartialEq)]
pub struct HealthScore {
    /// Clamped to `0..=100`.
    pub score: i32,
    pub emoji: &'static str,
    pub breakdown: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub action_plan: Vec<String>,
}

pub fn financial_health_score(
    income: f64,
    month_total: f64,
    goals: &[Goal],
    expenses: &[Expense],
) -> HealthScore {
    let mut score: i32 = 50;
    let mut breakdown = Vec::new();
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let mut action_plan = Vec::new();

    if income > 0.0 {
        let rate = (income - month_total) / income * 100.0;
        if rate >= 20.0 {
            score += 25;
            breakdown.push(format!("Savings Rate: +25 ({}% - Excellent!)", fixed1(rate)));
            strengths.push("Maintaining healthy savings rate above 20%".to_string());
        } else if rate >= 10.0 {
            score += 15;
            breakdown.push(format!("Savings Rate: +15 ({}% - Good)", fixed1(rate)));
            improvements.push("Increase savings rate to 20%".to_string());
            action_plan.push("Reduce discretionary spending by 10%".to_string());
        } else if rate > 0.0 {
            score += 5;
            breakdown.push(format!("Savings Rate: +5 ({}% - Needs work)", fixed1(rate)));
            improvements.push("Savings rate is below recommended 10%".to_string());
            action_plan.push("Set up automatic savings transfer on payday".to_string());
        } else {
            score -= 10;
            breakdown.push("Savings Rate: -10 (Spending exceeds income!)".to_string());
            improvements.push("Critical: Expenses exceed income".to_string());
            action_plan.push("Immediately review and cut non-essential expenses".to_string());
        }
    } else {
        breakdown.push("Savings Rate: 0 (Income not set)".to_string());
        action_plan.push("Set your monthly income in Profile".to_string());
    }

    match expenses.len() {
        n if n >= 20 => {
            score += 15;
            breakdown.push("Expense Tracking: +15 (Excellent tracking!)".to_string());
            strengths.push("Consistent expense tracking habit".to_string());
        }
        n if n >= 10 => {
            score += 10;
            breakdown.push("Expense Tracking: +10 (Good tracking)".to_string());
        }
        n if n >= 5 => {
            score += 5;
            breakdown.push("Expense Tracking: +5 (Getting started)".to_string());
            improvements.push("Track expenses more consistently".to_string());
            action_plan.push("Log every expense, no matter how small".to_string());
        }
        _ => {
            breakdown.push("Expense Tracking: 0 (Limited data)".to_string());
            action_plan.push("Start tracking all your daily expenses".to_string());
        }
    }

    match goals.len() {
        n if n >= 3 => {
            score += 10;
            breakdown.push("Financial Goals: +10 (Multiple goals set)".to_string());
            strengths.push("Clear financial goals established".to_string());
        }
        n if n >= 1 => {
            score += 5;
            breakdown.push("Financial Goals: +5 (Goals in progress)".to_string());
            action_plan.push("Add more savings goals for different timeframes".to_string());
        }
        _ => {
            breakdown.push("Financial Goals: 0 (No goals set)".to_string());
            improvements.push("No savings goals defined".to_string());
            action_plan.push("Create at least one savings goal".to_string());
        }
    }

    let emoji = match score {
        s if s >= 80 => "🌟",
        s if s >= 60 => "😊",
        s if s >= 40 => "😐",
        _ => "😟",
    };

    HealthScore {
        score: score.clamp(0, 100),
        emoji,
        breakdown,
        strengths,
        improvements,
        action_plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{Clock, FixedClock};
    use crate::domain::{ExpenseCategory, ExpenseInput, GoalInput};
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn intents_follow_keyword_order() {
        assert_eq!(
            AdvisorIntent::detect("How much did I spend this month?"),
            AdvisorIntent::Overview
        );
        assert_eq!(
            AdvisorIntent::detect("What have I SPENT THIS MONTH"),
            AdvisorIntent::MonthlySpending
        );
        assert_eq!(
            AdvisorIntent::detect("Am I on track with my savings goals?"),
            AdvisorIntent::Goals
        );
        assert_eq!(
            AdvisorIntent::detect("Give me tips to save more money"),
            AdvisorIntent::SavingTips
        );
        assert_eq!(
            AdvisorIntent::detect("Analyze my spending patterns"),
            AdvisorIntent::PatternAnalysis
        );
        assert_eq!(
            AdvisorIntent::detect("How can I improve my financial health?"),
            AdvisorIntent::FinancialHealth
        );
    }

    #[test]
    fn health_score_bands() {
        let expenses: Vec<_> = (1..=20)
            .map(|d| Expense::new(ExpenseInput::new(10.0, ExpenseCategory::Food, day(1, d)), "u"))
            .collect();
        let goals: Vec<_> = (0..3)
            .map(|i| Goal::new(GoalInput::new(format!("G{i}"), 100.0, day(12, 1)), "u"))
            .collect();
        let best = financial_health_score(10_000.0, 1_000.0, &goals, &expenses);
        assert_eq!(best.score, 100);
        assert_eq!(best.emoji, "🌟");
        assert_eq!(best.strengths.len(), 3);

        let worst = financial_health_score(1_000.0, 5_000.0, &[], &[]);
        assert_eq!(worst.score, 40);
        assert_eq!(worst.emoji, "😐");
        assert_eq!(worst.breakdown[0], "Savings Rate: -10 (Spending exceeds income!)");

        let unset = financial_health_score(0.0, 0.0, &[], &[]);
        assert_eq!(unset.score, 50);
        assert_eq!(unset.breakdown[0], "Savings Rate: 0 (Income not set)");
    }

    #[test]
    fn monthly_answer_without_spending_has_no_nan() {
        let now = FixedClock::at_date(2025, 3, 10).now();
        let expenses = vec![Expense::new(
            ExpenseInput::new(100.0, ExpenseCategory::Food, day(1, 5)),
            "u",
        )];
        let ctx = AdvisorContext {
            user_name: Some("Asha Rao"),
            snapshot: FinanceSnapshot::new(&expenses, &[], &[], 0.0),
            now,
        };
        let answer = respond("monthly spending please", &ctx);
        assert!(answer.contains("**Total Spent This Month:** ₹0"));
        assert!(answer.contains("No expenses recorded this month yet."));
        assert!(!answer.contains("NaN"));

        let hello = respond("hi", &ctx);
        assert!(hello.starts_with("👋 **Hello Asha!**"));
    }
}
