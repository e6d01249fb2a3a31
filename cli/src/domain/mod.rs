//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod app_state;
pub mod config;
pub mod describe;
pub mod error;
pub mod instance;

pub use app_state::{AppError, AppState};
pub use config::{FleetConfig, GatewayKind, validate_config_key, validate_config_value};
pub use error::{ConfigError, ErrorKind, GatewayError, InstanceError};
pub use instance::{Located, OsFamily, locate, validate_instance_id};
