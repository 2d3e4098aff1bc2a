use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

use super::usage;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "signup",
            "Create an account and log in",
            "signup <name> <email> <password>",
            cmd_signup,
        ),
        CommandEntry::new("login", "Log in", "login <email> <password>", cmd_login),
        CommandEntry::new("logout", "Log out", "logout", cmd_logout),
        CommandEntry::new("whoami", "Show the logged-in user", "whoami", cmd_whoami),
    ]
}

fn cmd_signup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, email, password] = args else {
        return Err(usage("signup <name> <email> <password>"));
    };
    let user = context.auth.signup(name, email, password)?;
    context.set_session(Some(&user))?;
    io::print_success(format!("Welcome, {}! Account created.", user.first_name()));
    Ok(())
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [email, password] = args else {
        return Err(usage("login <email> <password>"));
    };
    let user = context.auth.login(email, password)?;
    context.set_session(Some(&user))?;
    io::print_success(format!("Logged in as {}.", user.name));
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.auth.logout()?;
    context.set_session(None)?;
    io::print_info("Logged out.");
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    io::print_info(format!("{} <{}>", user.name, user.email));
    Ok(())
}
