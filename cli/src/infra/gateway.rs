//! Runtime choice between the HTTP and simulated control planes.

use anyhow::Result;
use fleet_common::{Instance, InstanceTypeInfo};

use crate::application::ports::{InstanceCommander, InstanceLister, InstanceTypeCatalog};
use crate::domain::config::{GatewayConfig, GatewayKind};
use crate::domain::GatewayError;
use crate::infra::http_gateway::HttpGateway;
use crate::infra::simulated::SimulatedGateway;

/// The control plane selected by configuration.
pub enum Gateway {
    Http(HttpGateway),
    Simulated(SimulatedGateway),
}

impl Gateway {
    /// Build the adapter named by `config.kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        match config.kind {
            GatewayKind::Http => {
                tracing::debug!(endpoint = %config.endpoint, "using HTTP control plane");
                Ok(Self::Http(HttpGateway::new(config)?))
            }
            GatewayKind::Simulated => {
                tracing::debug!("using simulated control plane");
                Ok(Self::Simulated(SimulatedGateway::default()))
            }
        }
    }
}

impl InstanceLister for Gateway {
    async fn list_instances(&self, owner: &str) -> Result<Vec<Instance>, GatewayError> {
        match self {
            Self::Http(gw) => gw.list_instances(owner).await,
            Self::Simulated(gw) => gw.list_instances(owner).await,
        }
    }
}

impl InstanceCommander for Gateway {
    async fn start(&self, id: &str) -> Result<(), GatewayError> {
        match self {
            Self::Http(gw) => gw.start(id).await,
            Self::Simulated(gw) => gw.start(id).await,
        }
    }

    async fn stop(&self, id: &str) -> Result<(), GatewayError> {
        match self {
            Self::Http(gw) => gw.stop(id).await,
            Self::Simulated(gw) => gw.stop(id).await,
        }
    }

    async fn terminate(&self, id: &str) -> Result<(), GatewayError> {
        match self {
            Self::Http(gw) => gw.terminate(id).await,
            Self::Simulated(gw) => gw.terminate(id).await,
        }
    }
}

impl InstanceTypeCatalog for Gateway {
    async fn describe_instance_type(
        &self,
        machine_type: &str,
    ) -> Result<InstanceTypeInfo, GatewayError> {
        match self {
            Self::Http(gw) => gw.describe_instance_type(machine_type).await,
            Self::Simulated(gw) => gw.describe_instance_type(machine_type).await,
        }
    }
}
