//! Human-readable terminal renderer.

use std::path::Path;

use fleet_common::{DesiredState, Instance};
use owo_colors::OwoColorize as _;

use crate::application::services::describe::InstanceDescription;
use crate::application::services::{Command, CommandOutcome};
use crate::domain::{FleetConfig, OsFamily};
use crate::output::{OutputContext, Styles};

const HEADERS: [&str; 6] = ["ID", "NAME", "STATE", "TYPE", "OS", "IP"];

/// Renders results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("fleet {version}");
    }

    /// Render the instance listing as a table.
    pub fn render_instances(&self, instances: &[Instance]) {
        if instances.is_empty() {
            self.ctx.info("No instances found for this owner.");
            return;
        }
        print!("{}", instance_table(instances, &self.ctx.styles));
    }

    /// Render the end of a state-change command.
    pub fn render_outcome(&self, command: Command, id: &str, outcome: &CommandOutcome) {
        let desired = command.desired_state();
        match outcome {
            CommandOutcome::Converged { polls } => {
                self.ctx.success(&converged_message(id, desired, *polls));
            }
            CommandOutcome::Exhausted {
                polls,
                last_observed,
            } => {
                let seen = last_observed.map_or_else(|| "unknown".to_string(), |s| s.to_string());
                self.ctx.warn(&format!(
                    "{id} has not reached {desired} after {polls} polls (last seen: {seen})."
                ));
                self.ctx
                    .info("The request was accepted; run 'fleet list' to check again later.");
            }
            // Failures are reported by the caller as errors.
            _ => {}
        }
    }

    pub fn render_description(&self, description: &InstanceDescription) {
        let instance = &description.instance;
        println!();
        println!(
            "  {}",
            format!("{} ({})", instance.name, instance.id).style(self.ctx.styles.header)
        );
        println!();
        self.ctx.kv("State:   ", &instance.state.to_string());
        self.ctx.kv("OS:      ", &instance.os);
        self.ctx.kv("Platform:", &instance.platform);
        self.ctx.kv("IP:      ", &instance.ip);
        self.ctx.kv("Image:   ", &instance.image_ref);
        println!();
        for line in description.summary.lines() {
            println!("  {line}");
        }
        println!();
    }

    /// Render the current configuration. The token value is never shown.
    pub fn render_config(&self, config: &FleetConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let owner = config.owner.as_deref().unwrap_or("(login name)");
        let kind = match config.gateway.kind {
            crate::domain::GatewayKind::Http => "http",
            crate::domain::GatewayKind::Simulated => "simulated",
        };
        let token = if config.gateway.token.is_some() {
            "(set)"
        } else {
            "(not set)"
        };
        println!("  {:<30} {owner}", "owner:");
        println!("  {:<30} {kind}", "gateway.kind:");
        println!("  {:<30} {}", "gateway.endpoint:", config.gateway.endpoint);
        println!("  {:<30} {token}", "gateway.token:");
        println!("  {:<30} {}", "gateway.timeout_secs:", config.gateway.timeout_secs);
        println!("  {:<30} {}", "reconcile.max_attempts:", config.reconcile.max_attempts);
        println!(
            "  {:<30} {}",
            "reconcile.poll_interval_secs:", config.reconcile.poll_interval_secs
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["FLEET_CONFIG", "FLEET_ENDPOINT", "FLEET_OWNER", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        let token_env = if std::env::var("FLEET_TOKEN").is_ok() {
            "(set)"
        } else {
            "(not set)"
        };
        println!("    {:<18} {token_env}", "FLEET_TOKEN:");
        println!();
    }
}

/// Success line for a converged command.
#[must_use]
pub fn converged_message(id: &str, desired: DesiredState, polls: u32) -> String {
    let noun = if polls == 1 { "poll" } else { "polls" };
    match desired {
        DesiredState::Terminated => format!("{id} terminated ({polls} {noun})"),
        _ => format!("{id} is {desired} ({polls} {noun})"),
    }
}

/// Lay out `instances` as an aligned table with a header row.
#[must_use]
pub fn instance_table(instances: &[Instance], styles: &Styles) -> String {
    let rows: Vec<[String; 6]> = instances
        .iter()
        .map(|i| {
            [
                i.id.clone(),
                i.name.clone(),
                i.state.label().to_string(),
                i.machine_type.clone(),
                format!("{} [{}]", i.os, OsFamily::of(&i.os).tag()),
                i.ip.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end().style(styles.bold)));

    for (row, instance) in rows.iter().zip(instances) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, w))| {
                let padded = format!("{cell:<w$}");
                if col == 2 {
                    padded.style(styles.state(instance.state)).to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ").trim_end()));
    }
    out
}
