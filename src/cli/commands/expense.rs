use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};
use crate::core::analytics::filter_expenses;
use crate::core::format::currency;
use crate::domain::{ExpenseCategory, ExpenseInput, ExpensePatch};

use super::{parse_amount, parse_date, resolve_id, short_id, usage};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "income",
            "Show or set monthly income",
            "income [amount]",
            cmd_income,
        ),
        CommandEntry::new(
            "add-expense",
            "Record an expense",
            "add-expense <amount> <category> <YYYY-MM-DD> [description]",
            cmd_add_expense,
        ),
        CommandEntry::new(
            "edit-expense",
            "Change one field of an expense",
            "edit-expense <id> <amount|category|date|description> <value>",
            cmd_edit_expense,
        ),
        CommandEntry::new(
            "delete-expense",
            "Delete an expense",
            "delete-expense <id>",
            cmd_delete_expense,
        ),
        CommandEntry::new(
            "expenses",
            "List expenses, newest first",
            "expenses [query] [--category <category>]",
            cmd_expenses,
        ),
    ]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.current_user()?;
    match args {
        [] => {
            io::print_info(format!("Monthly income: {}", currency(context.finance.income())));
            Ok(())
        }
        [amount] => {
            let income = parse_amount(amount, "income")?;
            context.finance.set_income(income)?;
            io::print_success(format!("Monthly income set to {}.", currency(income)));
            Ok(())
        }
        _ => Err(usage("income [amount]")),
    }
}

fn cmd_add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (amount, category, date, rest) = match args {
        [amount, category, date, rest @ ..] => (amount, category, date, rest),
        _ => {
            return Err(usage(
                "add-expense <amount> <category> <YYYY-MM-DD> [description]",
            ))
        }
    };
    let amount = parse_amount(amount, "amount")?;
    let category = ExpenseCategory::from_label(category);
    let date = parse_date(date)?;
    let input = ExpenseInput::new(amount, category, date).with_description(rest.join(" "));

    let expense = context.finance.add_expense(input)?;
    io::print_success(format!(
        "Added {} {} on {} [{}]",
        currency(expense.amount),
        expense.category,
        expense.date,
        short_id(&expense.id)
    ));
    if !expense.category.is_known() {
        io::print_hint(format!(
            "`{}` is not a standard category; it will be kept as entered.",
            expense.category
        ));
    }
    context.announce_unlocked();
    Ok(())
}

fn cmd_edit_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id, field, value] = args else {
        return Err(usage(
            "edit-expense <id> <amount|category|date|description> <value>",
        ));
    };
    let id = resolve_expense(context, id)?;
    let mut patch = ExpensePatch::default();
    match field.to_lowercase().as_str() {
        "amount" => patch.amount = Some(parse_amount(value, "amount")?),
        "category" => patch.category = Some(ExpenseCategory::from_label(value)),
        "date" => patch.date = Some(parse_date(value)?),
        "description" => patch.description = Some(value.to_string()),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown expense field `{}`",
                other
            )))
        }
    }
    context.finance.update_expense(&id, patch)?;
    io::print_success(format!("Updated expense {}.", short_id(&id)));
    Ok(())
}

fn cmd_delete_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage("delete-expense <id>"));
    };
    let id = resolve_expense(context, id)?;
    if !context.confirm(&format!("Delete expense {}?", short_id(&id)))? {
        io::print_info("Cancelled.");
        return Ok(());
    }
    let removed = context.finance.delete_expense(&id)?;
    io::print_success(format!(
        "Deleted {} {} from {}.",
        currency(removed.amount),
        removed.category,
        removed.date
    ));
    Ok(())
}

fn cmd_expenses(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.current_user()?;
    let mut query = Vec::new();
    let mut category = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "--category" {
            let Some(label) = iter.next() else {
                return Err(usage("expenses [query] [--category <category>]"));
            };
            category = Some(ExpenseCategory::from_label(label));
        } else {
            query.push(*arg);
        }
    }

    let expenses = filter_expenses(
        context.finance.expenses(),
        &query.join(" "),
        category.as_ref(),
    );
    output::section(format!("Expenses ({})", expenses.len()));
    if expenses.is_empty() {
        io::print_info("No expenses found.");
        return Ok(());
    }
    for expense in &expenses {
        output::line(format!(
            "  {}  {}  {:>12}  {} {:<14} {}",
            short_id(&expense.id),
            expense.date,
            currency(expense.amount),
            expense.category.icon(),
            expense.category.label(),
            expense.description
        ));
    }
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    output::line(format!("  Total: {}", currency(total)));
    Ok(())
}

fn resolve_expense(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    context.current_user()?;
    resolve_id(
        context.finance.expenses().iter().map(|e| e.id.as_str()),
        input,
        "expense",
    )
}
