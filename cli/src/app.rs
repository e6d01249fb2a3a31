//! Application context: unified state passed to every command handler.
//!
//! `AppContext` carries output settings, the config store and the
//! interactivity flag. `resolve_session` turns stored configuration plus
//! environment and flag overrides into the owner, gateway settings and
//! reconcile policy a command runs with.

use anyhow::Result;

use crate::application::services::ReconcilePolicy;
use crate::application::services::config_service;
use crate::domain::config::{FleetConfig, GatewayConfig, GatewayKind};
use crate::infra::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `FLEET_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Values that take precedence over the config file.
///
/// Flags win over environment variables, which win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--owner` or `FLEET_OWNER`.
    pub owner: Option<String>,
    /// `FLEET_ENDPOINT`.
    pub endpoint: Option<String>,
    /// `FLEET_TOKEN`.
    pub token: Option<String>,
    /// `--simulate`.
    pub simulate: bool,
    /// Fallback owner when nothing else names one.
    pub login_name: Option<String>,
}

impl Overrides {
    /// Read the environment part of the overrides.
    #[must_use]
    pub fn from_env(owner_flag: Option<String>, simulate: bool) -> Self {
        let non_empty = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            owner: owner_flag,
            endpoint: non_empty("FLEET_ENDPOINT"),
            token: non_empty("FLEET_TOKEN"),
            simulate,
            login_name: non_empty("USER").or_else(|| non_empty("USERNAME")),
        }
    }
}

/// Everything a controller needs, after overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub owner: String,
    pub gateway: GatewayConfig,
    pub policy: ReconcilePolicy,
}

/// Apply `overrides` on top of `config`.
///
/// # Errors
///
/// Returns an error if no owner can be determined.
pub fn resolve_session(config: FleetConfig, overrides: Overrides) -> Result<Session> {
    let FleetConfig {
        owner,
        mut gateway,
        reconcile,
    } = config;

    if let Some(endpoint) = overrides.endpoint {
        gateway.endpoint = endpoint.trim_end_matches('/').to_string();
    }
    if let Some(token) = overrides.token {
        gateway.token = Some(token);
    }
    if overrides.simulate {
        gateway.kind = GatewayKind::Simulated;
    }

    let owner = overrides
        .owner
        .or(owner)
        .or(overrides.login_name)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "cannot determine owner; pass --owner or run 'fleet config set owner <name>'"
            )
        })?;

    Ok(Session {
        owner,
        gateway,
        policy: ReconcilePolicy::from(&reconcile),
    })
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Config persistence.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `FLEET_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("FLEET_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            // JSON mode keeps stdout for the document alone.
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            config_store: YamlConfigStore,
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Load the config file and apply `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or no owner can be
    /// determined.
    pub fn session(&self, overrides: Overrides) -> Result<Session> {
        let config = config_service::load_config(&self.config_store)?;
        resolve_session(config, overrides)
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `FLEET_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
