//! HTTP/JSON implementation of the control-plane ports.
//!
//! Wire contract:
//! - `GET  {endpoint}/v1/instances?owner={owner}` → `{"instances": [...]}`
//! - `POST {endpoint}/v1/instances/{id}/{start|stop|terminate}` → any 2xx
//! - `GET  {endpoint}/v1/instance-types/{type}` → capability record
//! - non-2xx: `{"code": "...", "message": "..."}`, both optional

use anyhow::{Context, Result};
use fleet_common::{Instance, InstanceState, InstanceTypeInfo};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::application::ports::{InstanceCommander, InstanceLister, InstanceTypeCatalog};
use crate::domain::GatewayError;
use crate::domain::config::GatewayConfig;
use crate::domain::instance::os_from_image_description;

/// Control plane reached over HTTP with a bearer token.
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Build a gateway from configuration.
    ///
    /// A missing token is not an error here; every request made without one
    /// fails with [`GatewayError::Credentials`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("fleet/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self.token.as_deref().ok_or_else(|| {
            GatewayError::Credentials(
                "no API token configured; set FLEET_TOKEN or run 'fleet config set gateway.token <token>'"
                    .to_string(),
            )
        })?;
        Ok(req.bearer_auth(token))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self
            .authorized(req)?
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(parse_failure(status, &body))
    }

    async fn command(&self, id: &str, verb: &str) -> Result<(), GatewayError> {
        let url = format!("{}/v1/instances/{id}/{verb}", self.endpoint);
        self.send(self.client.post(&url)).await?;
        Ok(())
    }
}

impl InstanceLister for HttpGateway {
    async fn list_instances(&self, owner: &str) -> Result<Vec<Instance>, GatewayError> {
        let url = format!("{}/v1/instances", self.endpoint);
        let response = self
            .send(self.client.get(&url).query(&[("owner", owner)]))
            .await?;
        let listing: WireListing = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid listing: {e}")))?;
        Ok(listing.instances.into_iter().map(Instance::from).collect())
    }
}

impl InstanceCommander for HttpGateway {
    async fn start(&self, id: &str) -> Result<(), GatewayError> {
        self.command(id, "start").await
    }

    async fn stop(&self, id: &str) -> Result<(), GatewayError> {
        self.command(id, "stop").await
    }

    async fn terminate(&self, id: &str) -> Result<(), GatewayError> {
        self.command(id, "terminate").await
    }
}

impl InstanceTypeCatalog for HttpGateway {
    async fn describe_instance_type(
        &self,
        machine_type: &str,
    ) -> Result<InstanceTypeInfo, GatewayError> {
        let url = format!("{}/v1/instance-types/{machine_type}", self.endpoint);
        self.send(self.client.get(&url))
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid instance type record: {e}")))
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireListing {
    #[serde(default)]
    instances: Vec<WireInstance>,
}

/// One instance as the control plane sends it; every field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireInstance {
    id: Option<String>,
    name: Option<String>,
    platform: Option<String>,
    image_id: Option<String>,
    image_description: Option<String>,
    public_ip: Option<String>,
    instance_type: Option<String>,
    state: Option<InstanceState>,
}

impl From<WireInstance> for Instance {
    fn from(wire: WireInstance) -> Self {
        let platform = wire
            .platform
            .unwrap_or_else(|| "unknown platform".to_string());
        let os = wire
            .image_description
            .as_deref()
            .and_then(os_from_image_description)
            .unwrap_or_else(|| platform.clone());
        Self {
            id: wire.id.unwrap_or_else(|| "unknown id".to_string()),
            name: wire.name.unwrap_or_else(|| "unknown".to_string()),
            platform,
            os,
            ip: wire.public_ip.unwrap_or_else(|| "no public ip".to_string()),
            state: wire.state.unwrap_or_default(),
            machine_type: wire
                .instance_type
                .unwrap_or_else(|| "no instance type".to_string()),
            image_ref: wire.image_id.unwrap_or_else(|| "no image id".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireError {
    code: Option<String>,
    message: Option<String>,
}

/// Turn a non-2xx response into a gateway error.
///
/// A body that is not the JSON error object is kept as the message.
pub(crate) fn parse_failure(status: StatusCode, body: &str) -> GatewayError {
    let (code, message) = match serde_json::from_str::<WireError>(body) {
        Ok(err) => (err.code, err.message),
        Err(_) if body.trim().is_empty() => (None, None),
        Err(_) => (None, Some(body.trim().to_string())),
    };
    GatewayError::Api {
        status: Some(status.as_u16()),
        code,
        message,
    }
}
