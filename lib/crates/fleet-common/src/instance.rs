use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a remote compute instance.
///
/// Unrecognised wire values decode to `Unknown`; it is never a command target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    /// Wire name, as used by the control plane and in JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::ShuttingDown => "shutting_down",
            Self::Terminated => "terminated",
            Self::Unknown => "unknown",
        }
    }

    /// Human label shown in listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::ShuttingDown => "Shutting Down",
            Self::Terminated => "Terminated",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the instance is moving between two stable states.
    #[must_use]
    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Pending | Self::Stopping | Self::ShuttingDown)
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no known instance state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instance state '{0}' (expected one of: pending, running, stopping, stopped, shutting_down, terminated)")]
pub struct ParseStateError(pub String);

impl FromStr for InstanceState {
    type Err = ParseStateError;

    /// Accepts wire names (`shutting_down`) and labels (`Shutting Down`),
    /// case-insensitively. `unknown` is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "stopping" => Ok(Self::Stopping),
            "stopped" => Ok(Self::Stopped),
            "shutting_down" => Ok(Self::ShuttingDown),
            "terminated" => Ok(Self::Terminated),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

/// The states reachable through an explicit command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    Running,
    Stopped,
    Terminated,
}

impl DesiredState {
    /// Whether `observed` satisfies this directive.
    #[must_use]
    pub fn is_reached_by(self, observed: InstanceState) -> bool {
        InstanceState::from(self) == observed
    }
}

impl From<DesiredState> for InstanceState {
    fn from(desired: DesiredState) -> Self {
        match desired {
            DesiredState::Running => Self::Running,
            DesiredState::Stopped => Self::Stopped,
            DesiredState::Terminated => Self::Terminated,
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&InstanceState::from(*self), f)
    }
}

/// One remote compute resource as seen in a single listing.
///
/// `id`, `machine_type` and `image_ref` never change for a given instance;
/// the other fields are refreshed by every listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub os: String,
    pub ip: String,
    pub state: InstanceState,
    pub machine_type: String,
    pub image_ref: String,
}
