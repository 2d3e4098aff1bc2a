pub mod account;
pub mod backup;
pub mod expense;
pub mod goal;
pub mod insight;
pub mod system;

use chrono::NaiveDate;

use crate::cli::core::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};

const SHORT_ID_LEN: usize = 8;

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(account::definitions());
    commands.extend(expense::definitions());
    commands.extend(goal::definitions());
    commands.extend(insight::definitions());
    commands.extend(backup::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_entries() {
        registry.register(entry);
    }
}

pub(crate) fn parse_amount(input: &str, field: &str) -> Result<f64, CommandError> {
    let cleaned: String = input.chars().filter(|c| *c != ',' && *c != '₹').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid {} `{}` (expected a number)",
            field, input
        ))),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Resolves a full id or an unambiguous prefix of one.
pub(crate) fn resolve_id<'a>(
    ids: impl Iterator<Item = &'a str>,
    input: &str,
    kind: &str,
) -> Result<String, CommandError> {
    let mut matches = ids.filter(|id| id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id.to_string()),
        (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
            "{} id `{}` is ambiguous; type more characters",
            kind, input
        ))),
        (None, _) => Err(CommandError::Message(format!("{} `{}` not found", kind, input))),
    }
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}
