//! Command dispatcher: one state-change request, one classified outcome.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::fmt;

use fleet_common::DesiredState;

use crate::application::ports::InstanceCommander;
use crate::domain::{ErrorKind, GatewayError};

const NO_MESSAGE: &str = "no message";

/// A state-change command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Terminate,
}

impl Command {
    /// The state this command asks the instance to reach.
    #[must_use]
    pub fn desired_state(self) -> DesiredState {
        match self {
            Self::Start => DesiredState::Running,
            Self::Stop => DesiredState::Stopped,
            Self::Terminate => DesiredState::Terminated,
        }
    }

    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Terminate => "terminate",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Issue `command` against instance `id`.
///
/// Success carries no state: the new state is learned from the next listing.
///
/// # Errors
///
/// Returns the classified gateway failure.
pub async fn dispatch(
    gateway: &impl InstanceCommander,
    command: Command,
    id: &str,
) -> Result<(), ErrorKind> {
    tracing::info!(instance = id, %command, "dispatching command");
    let result = match command {
        Command::Start => gateway.start(id).await,
        Command::Stop => gateway.stop(id).await,
        Command::Terminate => gateway.terminate(id).await,
    };
    result.map_err(|err| classify(&err))
}

/// Map a gateway failure onto the fixed taxonomy.
///
/// Classification looks at the structured error code only. An unmapped code
/// is logged at error level so it can be added here.
#[must_use]
pub fn classify(err: &GatewayError) -> ErrorKind {
    match err {
        GatewayError::Transport(detail) => ErrorKind::ServiceError {
            detail: detail.clone(),
            message: "The control plane could not be reached. Check your network and endpoint."
                .to_string(),
        },
        GatewayError::Credentials(msg) => ErrorKind::Unauthorized(msg.clone()),
        GatewayError::Api { code, message, .. } => {
            let message = message.as_deref().unwrap_or(NO_MESSAGE);
            match code.as_deref() {
                Some("AccessDeniedException") => ErrorKind::Unauthorized(message.to_string()),
                Some("UnauthorizedOperation") => {
                    ErrorKind::Unauthorized(message.split(". ").collect::<Vec<_>>().join(".\n\n"))
                }
                Some("ValidationException" | "InvalidParameterValue") => {
                    ErrorKind::InvalidParameter(message.to_string())
                }
                Some(c) if c.starts_with("InvalidInstanceID") => {
                    ErrorKind::InvalidParameter(message.to_string())
                }
                other => {
                    tracing::error!(
                        code = other.unwrap_or("no error code"),
                        reason = message,
                        "unhandled control-plane error"
                    );
                    ErrorKind::Unknown(message.to_string())
                }
            }
        }
    }
}
