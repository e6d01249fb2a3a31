//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags, Overrides};
use crate::application::services::{Command as LifecycleCommand, FleetController};
use crate::commands;
use crate::infra::Gateway;

/// Start, stop and watch your remote compute instances
#[derive(Parser)]
#[command(
    name = "fleet",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log reconciliation progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Owner whose instances are managed (defaults to config, then login name)
    #[arg(long, global = true, env = "FLEET_OWNER")]
    pub owner: Option<String>,

    /// Use the in-memory simulated control plane
    #[arg(long, global = true)]
    pub simulate: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List your instances
    List(commands::list::ListArgs),

    /// Start a stopped instance and wait until it is running
    Start {
        /// Instance ID
        id: String,
    },

    /// Stop a running instance and wait until it is stopped
    Stop {
        /// Instance ID
        id: String,
    },

    /// Terminate an instance (irreversible)
    Terminate {
        /// Instance ID
        id: String,
    },

    /// Describe an instance and its machine type
    Describe {
        /// Instance ID
        id: String,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            verbose: _,
            owner,
            simulate,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        });

        match command {
            Command::Version => Ok(commands::version::run(&app)),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::List(args) => {
                let controller = controller(&app, owner, simulate)?;
                commands::list::run(&app, &controller, &args).await
            }
            Command::Start { id } => {
                let controller = controller(&app, owner, simulate)?;
                commands::lifecycle::run(&app, &controller, LifecycleCommand::Start, &id).await
            }
            Command::Stop { id } => {
                let controller = controller(&app, owner, simulate)?;
                commands::lifecycle::run(&app, &controller, LifecycleCommand::Stop, &id).await
            }
            Command::Terminate { id } => {
                let controller = controller(&app, owner, simulate)?;
                commands::lifecycle::run(&app, &controller, LifecycleCommand::Terminate, &id)
                    .await
            }
            Command::Describe { id } => {
                let controller = controller(&app, owner, simulate)?;
                commands::describe::run(&app, &controller, &id).await
            }
        }
    }
}

/// Resolve the session and build a controller over the configured gateway.
fn controller(
    app: &AppContext,
    owner: Option<String>,
    simulate: bool,
) -> Result<FleetController<Gateway>> {
    let session = app.session(Overrides::from_env(owner, simulate))?;
    let gateway = Gateway::from_config(&session.gateway)?;
    Ok(FleetController::new(gateway, session.owner, session.policy))
}
