use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};
use crate::core::analytics::{goal_progress, goal_totals, GoalStatus};
use crate::core::format::{currency, fixed1};
use crate::domain::GoalInput;

use super::{parse_amount, parse_date, resolve_id, short_id, usage};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add-goal",
            "Create a savings goal",
            "add-goal <name> <target> <YYYY-MM-DD>",
            cmd_add_goal,
        ),
        CommandEntry::new(
            "contribute",
            "Add money to a goal",
            "contribute <goal-id> <amount>",
            cmd_contribute,
        ),
        CommandEntry::new(
            "delete-goal",
            "Delete a savings goal",
            "delete-goal <id>",
            cmd_delete_goal,
        ),
        CommandEntry::new("goals", "List savings goals", "goals", cmd_goals),
        CommandEntry::new(
            "achievements",
            "List badges and unlock dates",
            "achievements",
            cmd_achievements,
        ),
    ]
}

fn cmd_add_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, target, deadline] = args else {
        return Err(usage("add-goal <name> <target> <YYYY-MM-DD>"));
    };
    let input = GoalInput::new(*name, parse_amount(target, "target")?, parse_date(deadline)?);
    let goal = context.finance.add_goal(input)?;
    io::print_success(format!(
        "Created goal `{}`: {} by {} [{}]",
        goal.name,
        currency(goal.target_amount),
        goal.deadline,
        short_id(&goal.id)
    ));
    context.announce_unlocked();
    Ok(())
}

fn cmd_contribute(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id, amount] = args else {
        return Err(usage("contribute <goal-id> <amount>"));
    };
    let id = resolve_goal(context, id)?;
    let amount = parse_amount(amount, "amount")?;
    let goal = context.finance.contribute_to_goal(&id, amount)?;
    let progress = goal_progress(&goal, context.finance.now());
    io::print_success(format!(
        "Added {} to `{}` ({} of {}, {}%)",
        currency(amount),
        goal.name,
        currency(goal.current_amount),
        currency(goal.target_amount),
        fixed1(progress.progress_pct)
    ));
    if progress.completed {
        io::print_success("Goal completed! 🎉");
    }
    context.announce_unlocked();
    Ok(())
}

fn cmd_delete_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage("delete-goal <id>"));
    };
    let id = resolve_goal(context, id)?;
    if !context.confirm(&format!("Delete goal {}?", short_id(&id)))? {
        io::print_info("Cancelled.");
        return Ok(());
    }
    let removed = context.finance.delete_goal(&id)?;
    io::print_success(format!("Deleted goal `{}`.", removed.name));
    Ok(())
}

fn cmd_goals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.current_user()?;
    let goals = context.finance.goals();
    let now = context.finance.now();
    output::section(format!("Goals ({})", goals.len()));
    if goals.is_empty() {
        io::print_info("No goals yet. Try `add-goal \"New Phone\" 20000 2026-12-31`.");
        return Ok(());
    }
    for goal in goals {
        let progress = goal_progress(goal, now);
        let status = match progress.status {
            GoalStatus::Completed => "completed".to_string(),
            GoalStatus::InProgress => format!(
                "{} days left, {}/day needed",
                progress.days_left,
                currency(progress.daily_amount_needed)
            ),
            GoalStatus::DeadlinePassed => "deadline passed".to_string(),
        };
        output::line(format!(
            "  {}  {:<20} {} / {} ({}%)  {}",
            short_id(&goal.id),
            goal.name,
            currency(goal.current_amount),
            currency(goal.target_amount),
            fixed1(progress.progress_pct),
            status
        ));
    }
    let totals = goal_totals(goals);
    output::line(format!(
        "  Saved {} of {} ({}%), {} completed",
        currency(totals.saved),
        currency(totals.target),
        fixed1(totals.overall_pct),
        totals.completed
    ));
    Ok(())
}

fn cmd_achievements(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.current_user()?;
    let badges = context.finance.achievements();
    let unlocked = badges.iter().filter(|a| a.is_unlocked()).count();
    output::section(format!("Achievements ({}/{})", unlocked, badges.len()));
    for badge in badges {
        let state = match badge.unlocked_at {
            Some(at) => format!("unlocked {}", at.format("%Y-%m-%d")),
            None => "locked".to_string(),
        };
        output::line(format!(
            "  {} {:<18} {:<36} {}",
            badge.icon, badge.title, badge.description, state
        ));
    }
    Ok(())
}

fn resolve_goal(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    context.current_user()?;
    resolve_id(
        context.finance.goals().iter().map(|g| g.id.as_str()),
        input,
        "goal",
    )
}
