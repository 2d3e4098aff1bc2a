use std::fs;
use std::path::PathBuf;

use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};
use crate::core::advisor::{respond, AdvisorContext, SUGGESTED_QUESTIONS};
use crate::core::format::{currency, fixed1, share_pct};
use crate::core::insights::InsightKind;
use crate::core::report::{dashboard_summary, render_text_report, report_file_name};

use super::usage;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Dashboard totals for this month",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "insights",
            "Rule-based spending insights",
            "insights",
            cmd_insights,
        ),
        CommandEntry::new(
            "monthly",
            "Month-by-month observations",
            "monthly",
            cmd_monthly,
        ),
        CommandEntry::new(
            "report",
            "Print the financial report, optionally saving it",
            "report [--save | <file>]",
            cmd_report,
        ),
        CommandEntry::new(
            "ask",
            "Ask the finance assistant a question",
            "ask <question>",
            cmd_ask,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.current_user()?;
    let now = context.finance.now();
    let summary = dashboard_summary(&context.finance.snapshot(), now);

    output::section("Summary");
    output::line(format!("  Total spent     : {}", currency(summary.total_spent)));
    output::line(format!("  This month      : {}", currency(summary.this_month)));
    match summary.balance {
        Some(balance) => output::line(format!("  Balance         : {}", currency(balance))),
        None => io::print_hint("Set your monthly income with `income <amount>`."),
    }
    output::line(format!(
        "  Goals           : {} saved of {} ({}%)",
        currency(summary.goals.saved),
        currency(summary.goals.target),
        fixed1(summary.goals.overall_pct)
    ));
    output::line(format!(
        "  Achievements    : {}/{}",
        summary.unlocked_achievements, summary.total_achievements
    ));

    if !summary.month_categories.is_empty() {
        output::section("This month by category");
        for row in &summary.month_categories {
            output::line(format!(
                "  {} {:<14} {:>12}  {}%",
                row.category.icon(),
                row.category.label(),
                currency(row.total),
                fixed1(share_pct(row.total, summary.this_month))
            ));
        }
    }
    if !summary.recent.is_empty() {
        output::section("Recent expenses");
        for expense in &summary.recent {
            output::line(format!(
                "  {}  {:>12}  {} {}",
                expense.date,
                currency(expense.amount),
                expense.category,
                expense.description
            ));
        }
    }
    Ok(())
}

fn cmd_insights(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.current_user()?;
    let insights = context.finance.insights();
    output::section("Insights");
    if insights.is_empty() {
        io::print_info("Add some expenses to get personalized insights.");
        return Ok(());
    }
    for insight in insights {
        let headline = format!("{}: {}", insight.title, insight.narrative);
        match insight.kind {
            InsightKind::Warning => io::print_warning(headline),
            InsightKind::Success => io::print_success(headline),
            InsightKind::Tip | InsightKind::Info => io::print_info(headline),
        }
        if let Some(recommendation) = insight.recommendation {
            io::print_hint(recommendation);
        }
    }
    Ok(())
}

fn cmd_monthly(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.current_user()?;
    let months = context.config.recent_months.max(1);
    output::section(format!("Monthly insights (last {} months)", months));
    for insight in context.finance.monthly_insights(months) {
        output::line(format!("  {}", insight.title));
        output::line(format!("    {}", insight.narrative));
    }
    Ok(())
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.current_user()?;
    let now = context.finance.now();
    let report = render_text_report(&context.finance.snapshot(), now);
    let target = match args {
        [] => None,
        ["--save"] => Some(context.store.base_dir().join(report_file_name(now))),
        [path] => Some(PathBuf::from(*path)),
        _ => return Err(usage("report [--save | <file>]")),
    };
    output::line(&report);
    if let Some(path) = target {
        fs::write(&path, &report)?;
        io::print_success(format!("Report saved to {}", path.display()));
    }
    Ok(())
}

fn cmd_ask(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    if args.is_empty() {
        output::section("Try asking");
        for question in SUGGESTED_QUESTIONS {
            output::line(format!("  ask \"{}\"", question));
        }
        return Ok(());
    }
    let question = args.join(" ");
    let advisor = AdvisorContext {
        user_name: Some(user.name.as_str()),
        snapshot: context.finance.snapshot(),
        now: context.finance.now(),
    };
    output::line(respond(&question, &advisor));
    Ok(())
}
