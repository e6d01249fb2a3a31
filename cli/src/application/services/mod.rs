//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_service;
pub mod controller;
pub mod describe;
pub mod dispatch;
pub mod reconcile;

pub use controller::{CommandOutcome, FleetController, Operation};
pub use dispatch::{Command, classify, dispatch};
pub use reconcile::{ListingDefect, ReconcileOutcome, ReconcilePolicy, reconcile};
