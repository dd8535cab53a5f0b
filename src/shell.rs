//! A small line-based command shell.
//!
//! Commands are registered by name together with the names of their positional
//! arguments. The shell knows nothing about what the commands do: each handler
//! receives the shared context `C` and its (padded) arguments, and returns the
//! text to print. A handler error stops the loop.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

pub const EXIT_COMMAND: &str = "quit";
pub const HELP_COMMAND: &str = "help";
const FAREWELL: &str = "Bye!";
const DEFAULT_PROMPT: &str = "> ";

pub type Handler<C, E> = Box<dyn FnMut(&mut C, &[String]) -> Result<String, E>>;
pub type Hook<C, E> = Box<dyn FnMut(&mut C) -> Result<(), E>>;

struct Registration<C, E> {
    handler: Handler<C, E>,
    args: Vec<String>,
    help: String,
}

pub struct Shell<C, E> {
    commands: HashMap<String, Registration<C, E>>,
    order: Vec<String>,
    start_up: Option<Hook<C, E>>,
    clean_up: Option<Hook<C, E>>,
    welcome_message: String,
    prompt: String,
}

impl<C, E> Default for Shell<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> Shell<C, E> {
    pub fn new() -> Self {
        Shell {
            commands: HashMap::new(),
            order: Vec::new(),
            start_up: None,
            clean_up: None,
            welcome_message: String::new(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Binds `name` to `handler`. The handler always receives exactly
    /// `args.len()` arguments; re-registering a name replaces the old handler.
    pub fn register<F>(&mut self, name: &str, args: &[&str], help: &str, handler: F)
    where
        F: FnMut(&mut C, &[String]) -> Result<String, E> + 'static,
    {
        if name == EXIT_COMMAND || name == HELP_COMMAND {
            warn!(command = name, "reserved command name is shadowed by a registration");
        }
        let registration = Registration {
            handler: Box::new(handler),
            args: args.iter().map(|a| a.to_string()).collect(),
            help: help.to_string(),
        };
        if self.commands.insert(name.to_string(), registration).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn set_start_up<F>(&mut self, hook: F)
    where
        F: FnMut(&mut C) -> Result<(), E> + 'static,
    {
        self.start_up = Some(Box::new(hook));
    }

    pub fn set_clean_up<F>(&mut self, hook: F)
    where
        F: FnMut(&mut C) -> Result<(), E> + 'static,
    {
        self.clean_up = Some(Box::new(hook));
    }

    pub fn set_welcome_message(&mut self, message: &str) {
        self.welcome_message = message.to_string();
    }

    pub fn help(&self) -> String {
        let mut out = String::from("HELP: command  [options...]         DESCRIPTION\n\n");
        out.push_str(&help_line(HELP_COMMAND, &[], "show this message"));
        out.push_str(&help_line(EXIT_COMMAND, &[], "quit the shell"));
        for name in &self.order {
            if let Some(reg) = self.commands.get(name) {
                out.push_str(&help_line(name, &reg.args, &reg.help));
            }
        }
        out
    }
}

impl<C, E> Shell<C, E>
where
    E: From<io::Error>,
{
    /// Runs the read-eval-print loop until the exit keyword or end of input.
    ///
    /// The clean-up hook runs exactly once, also when the start-up hook or a
    /// handler fails; that error is then returned and no farewell is printed.
    pub fn run<R, W>(&mut self, ctx: &mut C, mut input: R, mut output: W) -> Result<(), E>
    where
        R: BufRead,
        W: Write,
    {
        let outcome = match self.start(ctx, &mut output) {
            Ok(()) => self.repl(ctx, &mut input, &mut output),
            Err(e) => Err(e),
        };

        let cleaned = match self.clean_up.as_mut() {
            Some(hook) => hook(ctx),
            None => Ok(()),
        };
        outcome?;
        cleaned?;

        writeln!(output, "{FAREWELL}")?;
        output.flush()?;
        Ok(())
    }

    fn start<W: Write>(&mut self, ctx: &mut C, output: &mut W) -> Result<(), E> {
        if let Some(hook) = self.start_up.as_mut() {
            hook(ctx)?;
        }
        if !self.welcome_message.is_empty() {
            writeln!(output, "{}", self.welcome_message)?;
        }
        Ok(())
    }

    fn repl<R, W>(&mut self, ctx: &mut C, input: &mut R, output: &mut W) -> Result<(), E>
    where
        R: BufRead,
        W: Write,
    {
        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(());
            }

            let tokens = split_line(&line);
            let Some((command, raw_args)) = tokens.split_first() else {
                continue;
            };

            match self.commands.get_mut(command.as_str()) {
                Some(reg) => {
                    debug!(command = %command, args = ?raw_args, "dispatching");
                    let args = pad_args(raw_args, reg.args.len());
                    let result = (reg.handler)(ctx, &args)?;
                    writeln!(output, "{result}")?;
                }
                None if command == EXIT_COMMAND => return Ok(()),
                None if command == HELP_COMMAND => write!(output, "{}", self.help())?,
                None => {
                    debug!(command = %command, "unknown command");
                    writeln!(output, "see: > {HELP_COMMAND}")?;
                }
            }
        }
    }
}

fn help_line(name: &str, args: &[String], help: &str) -> String {
    let args = args
        .iter()
        .map(|arg| format!("[{arg}]"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{:<15}{:<21}{}\n", name, args, help)
}

/// Takes the first `arity` tokens, filling missing trailing ones with `""`.
fn pad_args(tokens: &[String], arity: usize) -> Vec<String> {
    let mut args: Vec<String> = tokens.iter().take(arity).cloned().collect();
    args.resize(arity, String::new());
    args
}

/// Splits on whitespace; a double-quoted span is kept as one token.
fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}
