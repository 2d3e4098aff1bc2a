use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

use super::usage;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "backup",
            "Snapshot your data to a backup file",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List your backups", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Restore your data from a backup",
            "restore <name>",
            cmd_restore,
        ),
    ]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = context.store.backup_user(&user.id, note.as_deref())?;
    io::print_success(format!("Backup created: {}", name));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    let names = context.store.list_backups(&user.id)?;
    output::section(format!("Backups ({})", names.len()));
    if names.is_empty() {
        io::print_info("No backups yet. Use `backup [note]` to create one.");
    }
    for (index, name) in names.iter().enumerate() {
        output::line(format!("  {:>2}. {}", index + 1, name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    let [reference] = args else {
        return Err(usage("restore <name>"));
    };
    let name = resolve_backup(context, &user.id, reference)?;
    if !context.confirm(&format!("Replace your current data with `{}`?", name))? {
        io::print_info("Cancelled.");
        return Ok(());
    }
    context.store.restore_backup(&user.id, &name)?;
    context.finance.reload()?;
    io::print_success(format!("Restored {}.", name));
    Ok(())
}

/// Accepts a file name or its 1-based position in `backups`.
fn resolve_backup(
    context: &ShellContext,
    user_id: &str,
    reference: &str,
) -> Result<String, CommandError> {
    match reference.parse::<usize>() {
        Ok(index) if index > 0 => {
            let names = context.store.list_backups(user_id)?;
            names.get(index - 1).cloned().ok_or_else(|| {
                CommandError::InvalidArguments(format!("no backup at position {}", index))
            })
        }
        _ => Ok(reference.to_string()),
    }
}
