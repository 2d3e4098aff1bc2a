//! Shared runtime state for CLI interactions and command execution.

use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::cli::core::{CliError, CliMode, CommandError, CommandResult, LoopControl};
use crate::cli::{commands, io as cli_io, output, registry::CommandRegistry};
use crate::config::{Config, ConfigManager};
use crate::core::services::{AuthService, FinanceStore};
use crate::core::time::{Clock, SystemClock};
use crate::domain::User;
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::utils::paths;

const SUGGESTION_DISTANCE: usize = 3;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub store: Arc<JsonFileStore>,
    pub auth: AuthService,
    pub finance: FinanceStore,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_clock(mode, Box::new(SystemClock))
    }

    /// Builds the shell over the app directory, restoring any saved session.
    pub fn with_clock(mode: CliMode, clock: Box<dyn Clock>) -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "configuration unreadable; using defaults");
                Config::default()
            }
        };
        output::set_color_enabled(config.ui_color_enabled);

        let root = config.data_dir.clone().unwrap_or(base);
        let store = Arc::new(JsonFileStore::new(
            Some(root),
            Some(config.backup_retention),
        )?);
        let shared: Arc<dyn KeyValueStore> = store.clone();
        let auth = AuthService::new(shared.clone());
        let mut finance = FinanceStore::new(shared, clock);
        if let Some(user) = auth.current_user()? {
            finance.switch_user(Some(&user))?;
        }

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            store,
            auth,
            finance,
            config_manager,
            config,
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn prompt(&self) -> String {
        match self.finance.user() {
            Some(user) => format!("paisapal({})> ", user.first_name()),
            None => "paisapal> ".to_string(),
        }
    }

    pub fn current_user(&self) -> Result<User, CommandError> {
        self.finance.user().cloned().ok_or(CommandError::NotLoggedIn)
    }

    /// Binds the record store to `user` (or clears it) and remembers the email.
    pub fn set_session(&mut self, user: Option<&User>) -> CommandResult {
        self.finance.switch_user(user)?;
        self.config.last_user_email = user.map(|u| u.email.clone());
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Yes/no confirmation; script mode always proceeds.
    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    /// Prints badges unlocked by the last mutation.
    pub fn announce_unlocked(&mut self) {
        for badge in self.finance.take_unlocked() {
            cli_io::print_success(format!(
                "Achievement unlocked: {} {} - {}",
                badge.icon, badge.title, badge.description
            ));
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NotLoggedIn => {
                cli_io::print_error("Not logged in. Use `login` or `signup` first.");
                cli_io::print_hint("Try `signup \"Your Name\" you@example.com secret`.");
                Ok(())
            }
            other => {
                tracing::debug!(error = ?other, "command failed");
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

/// Nearest command name within a small edit distance.
pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_nearby_commands_only() {
        let names = ["insights", "income", "goals"];
        assert_eq!(closest_command(names.into_iter(), "insigts"), Some("insights"));
        assert_eq!(closest_command(names.into_iter(), "GOALZ"), Some("goals"));
        assert_eq!(closest_command(names.into_iter(), "xyzzyplugh"), None);
    }
}
