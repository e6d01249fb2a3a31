//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Gateway errors ────────────────────────────────────────────────────────────

/// A failure reported by a control-plane adapter, before classification.
///
/// Adapters keep whatever structure the control plane gave them; turning it
/// into an [`ErrorKind`] is the dispatcher's job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The control plane answered with an error payload.
    #[error("control plane rejected the request ({}): {}", code.as_deref().unwrap_or("no error code"), message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status, when the transport has one.
        status: Option<u16>,
        /// Structured error code, e.g. `AccessDeniedException`.
        code: Option<String>,
        message: Option<String>,
    },

    /// No response was obtained: connection, timeout, or decoding failure.
    #[error("control plane unreachable: {0}")]
    Transport(String),

    /// No credentials are available to sign the request.
    #[error("no credentials available: {0}")]
    Credentials(String),
}

impl GatewayError {
    /// Shorthand for an API error carrying a code and a message.
    #[must_use]
    pub fn api(code: &str, message: &str) -> Self {
        Self::Api {
            status: None,
            code: Some(code.to_string()),
            message: Some(message.to_string()),
        }
    }
}

// ── Classified errors ─────────────────────────────────────────────────────────

/// The fixed taxonomy every gateway failure is classified into, exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("{message}")]
    ServiceError { detail: String, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl ErrorKind {
    /// Title shown to the user for this kind of failure.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized Error",
            Self::InvalidParameter(_) => "Invalid Parameter Error",
            Self::ServiceError { .. } => "Service Error",
            Self::Unknown(_) => "Unknown Error",
        }
    }

    /// Stable machine-readable code, used by `--json` output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::ServiceError { .. } => "SERVICE_ERROR",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// The user-facing message carried by every variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m) | Self::InvalidParameter(m) | Self::Unknown(m) => m,
            Self::ServiceError { message, .. } => message,
        }
    }

    /// Whether retrying the same request cannot succeed.
    ///
    /// Credentials and parameters do not change between polls; service and
    /// unknown failures may be transient.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::InvalidParameter(_))
    }
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors related to instance identity and listings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("Instance '{0}' not found. Run 'fleet list' to see your instances.")]
    NotFound(String),

    #[error("Instance '{0}' appears more than once in the listing.")]
    DuplicateId(String),

    #[error("Invalid instance ID '{0}': must be non-empty and contain only [A-Za-z0-9._-]")]
    InvalidId(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
