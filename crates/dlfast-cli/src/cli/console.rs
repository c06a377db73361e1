//! User-facing terminal lines.
//!
//! The display mode is decided once at startup and carried in [`Console`];
//! nothing toggles colour globally.

use colored::Colorize;
use std::env;
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Color,
    Plain,
}

impl DisplayMode {
    /// Colour only on a terminal, and never with `NO_COLOR` set or `TERM=dumb`.
    pub fn detect() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let dumb = env::var("TERM").is_ok_and(|t| t == "dumb");
        Self::from_parts(io::stdout().is_terminal(), no_color, dumb)
    }

    fn from_parts(is_terminal: bool, no_color: bool, dumb_terminal: bool) -> Self {
        if is_terminal && !no_color && !dumb_terminal {
            DisplayMode::Color
        } else {
            DisplayMode::Plain
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Success => "[SUCCESS]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }
}

fn format_line(mode: DisplayMode, level: Level, msg: &str) -> String {
    match mode {
        DisplayMode::Plain => format!("{} {}", level.tag(), msg),
        DisplayMode::Color => {
            let tag = match level {
                Level::Info => level.tag().blue(),
                Level::Success => level.tag().green(),
                Level::Warning => level.tag().yellow(),
                Level::Error => level.tag().red(),
            };
            format!("{} {}", tag.bold(), msg)
        }
    }
}

/// Prints tagged lines. Quiet mode drops info and success lines; warnings and
/// errors go to stderr and are always shown.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    mode: DisplayMode,
    quiet: bool,
}

impl Console {
    pub fn new(mode: DisplayMode, quiet: bool) -> Self {
        Self { mode, quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", format_line(self.mode, Level::Info, msg));
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", format_line(self.mode, Level::Success, msg));
        }
    }

    pub fn warning(&self, msg: &str) {
        eprintln!("{}", format_line(self.mode, Level::Warning, msg));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", format_line(self.mode, Level::Error, msg));
    }
}
