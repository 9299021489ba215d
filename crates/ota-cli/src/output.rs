//! Output helpers for ota-upload

use colored::Colorize;

/// Context for output rendering
pub struct OutputContext {
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { quiet }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a key-value pair, only the value in quiet mode
    pub fn print_kv(&self, key: &str, value: &str) {
        if self.quiet {
            println!("{}", value);
        } else {
            println!("{}: {}", key.bold(), value);
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }
}
