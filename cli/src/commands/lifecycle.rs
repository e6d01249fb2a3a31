//! `fleet start|stop|terminate`: issue a state change and wait for it.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::ControlPlane;
use crate::application::services::{Command, CommandOutcome, FleetController, Operation};
use crate::commands::outcome_error;
use crate::domain::validate_instance_id;
use crate::output::progress;

/// Run a state-change command against instance `id`.
///
/// Terminate asks for confirmation unless prompts are disabled. While the
/// controller reconciles, a spinner shows the last observed state. Ctrl-C
/// stops waiting but cannot recall a request that was already sent.
///
/// # Errors
///
/// Returns an error if the id is malformed, the prompt fails, or the command
/// fails or leaves the listing inconsistent.
pub async fn run<G: ControlPlane>(
    app: &AppContext,
    controller: &FleetController<G>,
    command: Command,
    id: &str,
) -> Result<ExitCode> {
    validate_instance_id(id)?;

    if command == Command::Terminate {
        let prompt = format!("Terminate {id}? This cannot be undone.");
        if !app.non_interactive && !app.confirm(&prompt, false)? {
            app.output.info("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let op = match command {
        Command::Start => Operation::Start(id.to_string()),
        Command::Stop => Operation::Stop(id.to_string()),
        Command::Terminate => Operation::Terminate(id.to_string()),
    };
    let desired = command.desired_state();

    let spinner = app
        .output
        .show_progress()
        .then(|| progress::spinner(&format!("Waiting for {id} to reach {desired}...")));

    let mut snapshots = controller.subscribe_instances();
    let run = controller.run(op);
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut run => break outcome,
            _ = tokio::signal::ctrl_c() => {
                if let Some(pb) = &spinner {
                    progress::finish_warn(pb, "Stopped waiting");
                }
                app.output.info(&format!(
                    "The {command} request for {id} was already sent; run 'fleet list' to follow it."
                ));
                return Ok(ExitCode::from(130));
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break (&mut run).await;
                }
                let observed = snapshots
                    .borrow_and_update()
                    .iter()
                    .find(|i| i.id == id)
                    .map(|i| i.state);
                if let (Some(pb), Some(state)) = (&spinner, observed) {
                    pb.set_message(format!("Waiting for {id} to reach {desired} (now {state})..."));
                }
            }
        }
    };

    match &outcome {
        CommandOutcome::Converged { .. } => {
            if let Some(pb) = &spinner {
                progress::finish_ok(pb, &format!("{id} reached {desired}"));
            }
        }
        CommandOutcome::Exhausted { .. } => {
            if let Some(pb) = &spinner {
                progress::finish_warn(pb, &format!("{id} has not reached {desired} yet"));
            }
        }
        _ => {
            if let Some(pb) = &spinner {
                progress::finish_error(pb, &format!("{command} {id} failed"));
            }
            return Err(outcome_error(&outcome, id));
        }
    }

    app.renderer()
        .render_outcome(command, id, &outcome, &controller.instances())?;
    Ok(ExitCode::SUCCESS)
}
