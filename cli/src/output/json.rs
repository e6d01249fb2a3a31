//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document to
//! stdout. Failures use the error object from [`format_error`].

use std::path::Path;

use anyhow::{Context, Result};
use fleet_common::{Instance, InstanceState};
use serde::Serialize;

use crate::application::services::describe::InstanceDescription;
use crate::application::services::{Command, CommandOutcome};
use crate::domain::FleetConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Result of a state-change command, as printed by `--json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OutcomeReport<'a> {
    pub instance: &'a str,
    pub command: &'static str,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polls: Option<u32>,
    /// Last state observed for the instance, if it was in the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<InstanceState>,
}

impl<'a> OutcomeReport<'a> {
    #[must_use]
    pub fn new(
        command: Command,
        id: &'a str,
        outcome: &CommandOutcome,
        instances: &[Instance],
    ) -> Self {
        let (name, polls) = match outcome {
            CommandOutcome::Listed { .. } => ("listed", None),
            CommandOutcome::Converged { polls } => ("converged", Some(*polls)),
            CommandOutcome::Exhausted { polls, .. } => ("exhausted", Some(*polls)),
            CommandOutcome::Failed(_) => ("failed", None),
            CommandOutcome::Inconsistent(_) => ("inconsistent", None),
            CommandOutcome::Superseded => ("superseded", None),
        };
        let state = instances.iter().find(|i| i.id == id).map(|i| i.state);
        Self {
            instance: id,
            command: command.verb(),
            outcome: name,
            polls,
            state,
        }
    }
}

/// Renders results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_instances(&self, instances: &[Instance]) -> Result<()> {
        print(&serde_json::json!({ "instances": instances }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, report: &OutcomeReport<'_>) -> Result<()> {
        print(report)
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_description(&self, description: &InstanceDescription) -> Result<()> {
        print(description)
    }

    /// The token is never printed; only whether one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &FleetConfig, path: &Path) -> Result<()> {
        print(&serde_json::json!({
            "path": path.display().to_string(),
            "owner": config.owner,
            "gateway": {
                "kind": config.gateway.kind,
                "endpoint": config.gateway.endpoint,
                "token_set": config.gateway.token.is_some(),
                "timeout_secs": config.gateway.timeout_secs,
            },
            "reconcile": config.reconcile,
        }))
    }

    pub fn render_version(&self, version: &str) {
        println!(r#"{{"version":"{version}"}}"#);
    }
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
