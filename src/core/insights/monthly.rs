use serde::Serialize;

use crate::core::analytics::{CategoryTotal, MonthlyTotal};
use crate::core::format::{currency, currency_rounded, fixed1, round_half_up, share_pct, signed_percent};

/// Month-level observation shown beside the monthly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyInsight {
    pub title: String,
    pub narrative: String,
}

impl MonthlyInsight {
    fn new(title: impl Into<String>, narrative: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            narrative: narrative.into(),
        }
    }
}

/// Observations over `months` (oldest first).
///
/// `categories` should hold the category totals of the latest month.
/// Fewer than two months produce a single explanatory entry.
pub fn generate_monthly_insights(
    months: &[MonthlyTotal],
    categories: &[CategoryTotal],
    income: f64,
) -> Vec<MonthlyInsight> {
    let (latest, previous) = match months {
        [] => {
            return vec![MonthlyInsight::new(
                "No Data Yet",
                "Add a few expenses to see how your spending changes from month to month.",
            )]
        }
        [only] => {
            return vec![MonthlyInsight::new(
                "First Month",
                format!(
                    "{}: {}\n\nThis is your first month of tracked spending. Trends and comparisons will appear once a second month is recorded.",
                    only.label,
                    currency(only.total)
                ),
            )]
        }
        [.., previous, latest] => (latest, previous),
    };

    let average = months.iter().map(|m| m.total).sum::<f64>() / months.len() as f64;
    let mut insights = vec![
        trend(latest, previous, average),
        peaks(months),
        versus_average(latest, average),
    ];
    if let Some(top) = categories.first() {
        if latest.total > 0.0 {
            insights.push(MonthlyInsight::new(
                "Top Category Impact",
                format!(
                    "{} accounts for {}% of current month expenses.\nAmount: {}\n\nFocusing on this category alone could have the biggest impact on your budget.",
                    top.category.label(),
                    fixed1(share_pct(top.total, latest.total)),
                    currency(top.total)
                ),
            ));
        }
    }
    if income > 0.0 {
        insights.push(income_coverage(latest, income));
    }
    tracing::debug!(count = insights.len(), "generated monthly insights");
    insights
}

fn trend(latest: &MonthlyTotal, previous: &MonthlyTotal, average: f64) -> MonthlyInsight {
    let change = if previous.total > 0.0 {
        signed_percent((latest.total - previous.total) / previous.total * 100.0)
    } else {
        "n/a (no spending recorded)".to_string()
    };
    let direction = if latest.total > previous.total {
        "increasing"
    } else if latest.total < previous.total {
        "decreasing"
    } else {
        "holding steady"
    };
    MonthlyInsight::new(
        "Monthly Trend",
        format!(
            "{}: {}\nChange from {}: {}\n\nYour spending is {} month over month. Average monthly spend: {}",
            latest.label,
            currency(latest.total),
            previous.label,
            change,
            direction,
            currency_rounded(average)
        ),
    )
}

fn peaks(months: &[MonthlyTotal]) -> MonthlyInsight {
    let mut sorted: Vec<&MonthlyTotal> = months.iter().collect();
    sorted.sort_by(|a, b| b.total.total_cmp(&a.total));
    let highest = sorted[0];
    let lowest = sorted[sorted.len() - 1];
    let variation = if lowest.total > 0.0 {
        format!(
            "This {}% variation shows seasonal or lifestyle patterns.",
            fixed1((highest.total / lowest.total - 1.0) * 100.0)
        )
    } else {
        "Your lowest month had no recorded spending, so variation can't be measured yet.".to_string()
    };
    MonthlyInsight::new(
        "Peak Analysis",
        format!(
            "Highest: {} ({})\nLowest: {} ({})\nDifference: {}\n\n{}",
            highest.label,
            currency(highest.total),
            lowest.label,
            currency(lowest.total),
            currency(highest.total - lowest.total),
            variation
        ),
    )
}

fn versus_average(latest: &MonthlyTotal, average: f64) -> MonthlyInsight {
    let diff = latest.total - average;
    let sign = if diff > 0.0 { "+" } else { "" };
    let position = if average <= 0.0 {
        "There is no average spending to compare against yet.".to_string()
    } else if diff == 0.0 {
        "You're right at your average.".to_string()
    } else {
        format!(
            "You're {} your average by {}%",
            if diff > 0.0 { "above" } else { "below" },
            fixed1(diff.abs() / average * 100.0)
        )
    };
    MonthlyInsight::new(
        "Monthly Average",
        format!(
            "Average spend: {}\nCurrent month: {}\nDifference: {}{}\n\n{}",
            currency_rounded(average),
            currency(latest.total),
            sign,
            currency(round_half_up(diff)),
            position
        ),
    )
}

fn income_coverage(latest: &MonthlyTotal, income: f64) -> MonthlyInsight {
    let used = share_pct(latest.total, income);
    let left = income - latest.total;
    let closing = if left >= 0.0 {
        format!("{} of your income remained after expenses.", currency(left))
    } else {
        format!("Spending exceeded your income by {}.", currency(left.abs()))
    };
    MonthlyInsight::new(
        "Income Coverage",
        format!(
            "{} spending used {}% of your monthly income ({}).\n\n{}",
            latest.label,
            fixed1(used),
            currency(income),
            closing
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExpenseCategory, YearMonth};

    fn month(year: i32, m: u32, total: f64) -> MonthlyTotal {
        let key = YearMonth::new(year, m);
        MonthlyTotal {
            key,
            label: key.label(),
            total,
        }
    }

    #[test]
    fn empty_history_gets_placeholder() {
        let insights = generate_monthly_insights(&[], &[], 0.0);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "No Data Yet");
    }

    #[test]
    fn single_month_is_first_month_only() {
        let insights = generate_monthly_insights(&[month(2025, 1, 1200.0)], &[], 5000.0);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "First Month");
        assert!(insights[0].narrative.starts_with("Jan 25: ₹1,200"));
    }

    #[test]
    fn zero_previous_month_is_guarded() {
        let months = [month(2025, 1, 0.0), month(2025, 2, 800.0)];
        let insights = generate_monthly_insights(&months, &[], 0.0);
        let titles: Vec<_> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Monthly Trend", "Peak Analysis", "Monthly Average"]);
        assert!(insights[0].narrative.contains("Change from Jan 25: n/a"));
        assert!(insights[1].narrative.contains("variation can't be measured"));
        assert!(insights.iter().all(|i| !i.narrative.contains("NaN")));
    }

    #[test]
    fn full_report_with_income() {
        let months = [month(2025, 1, 1000.0), month(2025, 2, 1500.0)];
        let categories = [CategoryTotal {
            category: ExpenseCategory::Food,
            total: 600.0,
        }];
        let insights = generate_monthly_insights(&months, &categories, 3000.0);
        assert_eq!(insights.len(), 5);
        assert!(insights[0].narrative.contains("Change from Jan 25: +50.0%"));
        assert!(insights[1].narrative.contains("This 50.0% variation"));
        assert!(insights[2].narrative.contains("Difference: +₹250"));
        assert!(insights[3].narrative.starts_with("Food accounts for 40.0%"));
        assert_eq!(insights[4].title, "Income Coverage");
        assert!(insights[4].narrative.contains("used 50.0% of your monthly income (₹3,000)"));
    }
}
