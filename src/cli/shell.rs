//! Line-driven front end. A single loop pulls lines from a [`LineSource`]:
//! the rustyline editor when interactive, stdin when scripted.

use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandRegistry;
use crate::domain::ExpenseCategory;

/// Set to run commands from stdin without prompts or confirmations.
pub const SCRIPT_ENV: &str = "PAISAPAL_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => {
            let mut source = EditorSource::new(&context.registry)?;
            output::info("Welcome to PaisaPal. Type `help` to list commands.");
            drive(&mut context, &mut source)
        }
        CliMode::Script => {
            let stdin = io::stdin();
            let mut source = ScriptSource::new(stdin.lock());
            drive(&mut context, &mut source)
        }
    }
}

pub(crate) enum Input {
    Line(String),
    Interrupted,
    Closed,
}

pub(crate) trait LineSource {
    fn next_line(&mut self, prompt: &str) -> Result<Input, CliError>;
}

struct EditorSource {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl EditorSource {
    fn new(registry: &CommandRegistry) -> Result<Self, CliError> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::from_registry(registry)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.trim()).ok();
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                Ok(Input::Closed)
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub(crate) struct ScriptSource<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> ScriptSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Input, CliError> {
        match self.lines.next() {
            Some(line) => Ok(Input::Line(line?)),
            None => Ok(Input::Closed),
        }
    }
}

pub(crate) fn drive(
    context: &mut ShellContext,
    source: &mut dyn LineSource,
) -> Result<(), CliError> {
    while context.running {
        let prompt = context.prompt();
        match source.next_line(&prompt)? {
            Input::Closed => break,
            Input::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Input::Line(line) => match execute(context, &line) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => context.running = false,
                Err(err) => context.report_error(err)?,
            },
        }
    }
    Ok(())
}

/// Runs one shell line. Blank lines and `#` comments do nothing.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(message) => {
            context.print_warning(&message);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.dispatch(&raw.to_lowercase(), raw, &args)
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, String> {
    shell_words::split(input).map_err(|err| err.to_string())
}

/// What an argument position accepts, read off a command's usage line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Category,
    Choice(Vec<String>),
    Free,
}

impl Slot {
    fn parse(placeholder: &str) -> Self {
        let inner = placeholder.trim_matches(|c| matches!(c, '<' | '>' | '[' | ']'));
        if inner == "category" {
            Slot::Category
        } else if inner.contains('|') {
            Slot::Choice(inner.split('|').map(str::to_string).collect())
        } else {
            Slot::Free
        }
    }

    fn options(&self) -> Vec<String> {
        match self {
            Slot::Category => ExpenseCategory::KNOWN
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            Slot::Choice(values) => values.clone(),
            Slot::Free => Vec::new(),
        }
    }
}

struct CommandShape {
    name: &'static str,
    usage: &'static str,
    slots: Vec<Slot>,
}

/// Completes command names, category labels and fixed choices such as the
/// `edit-expense` field, and hints the remaining usage after a command.
pub(crate) struct ShellHelper {
    commands: Vec<CommandShape>,
}

impl ShellHelper {
    pub(crate) fn from_registry(registry: &CommandRegistry) -> Self {
        let mut commands: Vec<CommandShape> = registry
            .list()
            .into_iter()
            .map(|entry| CommandShape {
                name: entry.name,
                usage: entry.usage,
                slots: entry
                    .usage
                    .split_whitespace()
                    .skip(1)
                    .map(Slot::parse)
                    .collect(),
            })
            .collect();
        commands.sort_by_key(|shape| shape.name);
        Self { commands }
    }

    fn shape(&self, name: &str) -> Option<&CommandShape> {
        let name = name.to_ascii_lowercase();
        self.commands.iter().find(|shape| shape.name == name)
    }

    /// Start offset of the word under the cursor and its candidates.
    fn candidates(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_ascii_lowercase();
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();

        let pool: Vec<String> = match words.split_first() {
            None => self.commands.iter().map(|s| s.name.to_string()).collect(),
            Some((_, before)) if before.last() == Some(&"--category") => Slot::Category.options(),
            Some((command, before)) => self
                .shape(command)
                .and_then(|shape| shape.slots.get(before.len()))
                .map(Slot::options)
                .unwrap_or_default(),
        };
        let matches = pool
            .into_iter()
            .filter(|option| option.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, matches)
    }

    /// Remaining usage once a known command and a space have been typed.
    fn usage_hint(&self, line: &str) -> Option<String> {
        if !line.ends_with(' ') {
            return None;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let (command, given) = words.split_first()?;
        let shape = self.shape(command)?;
        let remaining: Vec<&str> = shape.usage.split_whitespace().skip(1 + given.len()).collect();
        if remaining.is_empty() {
            None
        } else {
            Some(remaining.join(" "))
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|option| Pair {
                display: option.clone(),
                replacement: option,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.usage_hint(line)
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for ShellHelper {}
