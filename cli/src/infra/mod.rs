//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the HTTP control-plane
//! client, the in-memory simulated control plane, and config file access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod gateway;
pub mod http_gateway;
pub mod simulated;

pub use config::YamlConfigStore;
pub use gateway::Gateway;
pub use http_gateway::HttpGateway;
pub use simulated::SimulatedGateway;
