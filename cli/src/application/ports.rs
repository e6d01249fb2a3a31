//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `fleet_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;
use fleet_common::{Instance, InstanceTypeInfo};

use crate::domain::{FleetConfig, GatewayError};

// ── Control-plane Port Traits ─────────────────────────────────────────────────

/// Read side of the control plane: the user's current instances.
#[allow(async_fn_in_trait)]
pub trait InstanceLister {
    /// List every instance tagged with `owner`.
    async fn list_instances(&self, owner: &str) -> Result<Vec<Instance>, GatewayError>;
}

/// State-change requests. Each call is a fire-and-forget trigger: success
/// means the request was accepted, not that the instance changed state.
#[allow(async_fn_in_trait)]
pub trait InstanceCommander {
    async fn start(&self, id: &str) -> Result<(), GatewayError>;
    async fn stop(&self, id: &str) -> Result<(), GatewayError>;
    async fn terminate(&self, id: &str) -> Result<(), GatewayError>;
}

/// Machine-type capability lookup.
#[allow(async_fn_in_trait)]
pub trait InstanceTypeCatalog {
    async fn describe_instance_type(
        &self,
        machine_type: &str,
    ) -> Result<InstanceTypeInfo, GatewayError>;
}

/// Composite trait: any type implementing all three sub-traits is a `ControlPlane`.
pub trait ControlPlane: InstanceLister + InstanceCommander + InstanceTypeCatalog {}

/// Blanket implementation: any type implementing all three sub-traits is a `ControlPlane`.
impl<T> ControlPlane for T where T: InstanceLister + InstanceCommander + InstanceTypeCatalog {}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence (load/save).
pub trait ConfigStore {
    /// Load the configuration, returning defaults when none is stored.
    fn load(&self) -> Result<FleetConfig>;
    /// Persist the configuration.
    fn save(&self, config: &FleetConfig) -> Result<()>;
    /// Location of the stored configuration.
    fn path(&self) -> Result<PathBuf>;
}
