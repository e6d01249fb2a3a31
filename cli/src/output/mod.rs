//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use fleet_common::Instance;
use owo_colors::OwoColorize as _;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use styles::Styles;

use crate::application::services::describe::InstanceDescription;
use crate::application::services::{Command, CommandOutcome};
use crate::domain::{AppError, ErrorKind, FleetConfig};

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Human or JSON rendering, chosen once per invocation.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_instances(&self, instances: &[Instance]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_instances(instances);
                Ok(())
            }
            Self::Json(r) => r.render_instances(instances),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(
        &self,
        command: Command,
        id: &str,
        outcome: &CommandOutcome,
        instances: &[Instance],
    ) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(command, id, outcome);
                Ok(())
            }
            Self::Json(r) => {
                r.render_outcome(&json::OutcomeReport::new(command, id, outcome, instances))
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_description(&self, description: &InstanceDescription) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_description(description);
                Ok(())
            }
            Self::Json(r) => r.render_description(description),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &FleetConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }

    pub fn render_version(&self, version: &str) {
        match self {
            Self::Human(r) => r.render_version(version),
            Self::Json(r) => r.render_version(version),
        }
    }
}

/// Render a failed command.
///
/// Classified failures keep their title and stable code; anything else is
/// reported with code `ERROR`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn report_error(err: &anyhow::Error, json: bool) -> Result<()> {
    let kind = err.chain().find_map(|e| e.downcast_ref::<ErrorKind>());
    if json {
        let (message, code) = match kind {
            Some(kind) => (kind.message().to_string(), kind.code()),
            None => (format!("{err:#}"), "ERROR"),
        };
        println!("{}", json::format_error(&message, code)?);
        return Ok(());
    }
    match kind {
        Some(kind) => {
            let app_error = AppError::from(kind);
            eprintln!("Error: {}: {}", app_error.title, app_error.message);
            if let Some(cause) = app_error.cause {
                eprintln!("  caused by: {cause}");
            }
        }
        None => eprintln!("Error: {err:#}"),
    }
    Ok(())
}
