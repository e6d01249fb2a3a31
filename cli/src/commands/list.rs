//! `fleet list`: show the owner's instances.

use anyhow::Result;
use clap::Args;
use fleet_common::InstanceState;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::ControlPlane;
use crate::application::services::{CommandOutcome, FleetController};
use crate::commands::outcome_error;

/// Arguments for `fleet list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only show instances in this state (e.g. `running`, `shutting-down`)
    #[arg(long, value_parser = clap::value_parser!(InstanceState))]
    pub state: Option<InstanceState>,
}

/// Run `fleet list`.
///
/// # Errors
///
/// Returns the classified failure if the listing cannot be fetched.
pub async fn run<G: ControlPlane>(
    app: &AppContext,
    controller: &FleetController<G>,
    args: &ListArgs,
) -> Result<ExitCode> {
    let outcome = controller.list_instances().await;
    if !matches!(outcome, CommandOutcome::Listed { .. }) {
        return Err(outcome_error(&outcome, "listing"));
    }

    let instances = controller.instances();
    let shown: Vec<_> = instances
        .iter()
        .filter(|i| args.state.is_none_or(|s| i.state == s))
        .cloned()
        .collect();
    app.renderer().render_instances(&shown)?;
    Ok(ExitCode::SUCCESS)
}
