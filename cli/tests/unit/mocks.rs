//! Shared stub infrastructure for unit tests.
//!
//! [`ScriptedGateway`] replays a script of listings and records every call,
//! so tests can assert exactly how many polls and commands were issued.

#![allow(dead_code, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use fleet_cli::application::ports::{InstanceCommander, InstanceLister, InstanceTypeCatalog};
use fleet_cli::domain::GatewayError;
use fleet_common::{Instance, InstanceState, InstanceTypeInfo};

// ── Builders ──────────────────────────────────────────────────────────────────

pub fn instance(id: &str, state: InstanceState) -> Instance {
    Instance {
        id: id.to_string(),
        name: format!("{id}-name"),
        platform: "Linux/UNIX".to_string(),
        os: "Amazon Linux".to_string(),
        ip: "10.0.0.1".to_string(),
        state,
        machine_type: "t3.micro".to_string(),
        image_ref: "ami-1".to_string(),
    }
}

/// A listing holding only `id` in `state`.
pub fn only(id: &str, state: InstanceState) -> Result<Vec<Instance>, GatewayError> {
    Ok(vec![instance(id, state)])
}

// ── Scripted gateway ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Start(String),
    Stop(String),
    Terminate(String),
    DescribeType(String),
}

/// Gateway stub driven by a script.
///
/// Each listing pops the next scripted response; the last one repeats once
/// the script runs out. Every call first yields to the runtime.
pub struct ScriptedGateway {
    listings: RefCell<VecDeque<Result<Vec<Instance>, GatewayError>>>,
    command_error: Option<GatewayError>,
    list_delay: Option<Duration>,
    catalog: Option<InstanceTypeInfo>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new(listings: Vec<Result<Vec<Instance>, GatewayError>>) -> Self {
        Self {
            listings: RefCell::new(listings.into()),
            command_error: None,
            list_delay: None,
            catalog: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command fails with `err`.
    pub fn failing_commands(mut self, err: GatewayError) -> Self {
        self.command_error = Some(err);
        self
    }

    /// Each listing takes `delay` to answer.
    pub fn slow_listings(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn with_catalog(mut self, info: InstanceTypeInfo) -> Self {
        self.catalog = Some(info);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::List(_)))
            .count()
    }

    pub fn command_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Start(_) | Call::Stop(_) | Call::Terminate(_)))
            .count()
    }

    async fn command(&self, call: Call) -> Result<(), GatewayError> {
        tokio::task::yield_now().await;
        self.calls.borrow_mut().push(call);
        match &self.command_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl InstanceLister for ScriptedGateway {
    async fn list_instances(&self, owner: &str) -> Result<Vec<Instance>, GatewayError> {
        tokio::task::yield_now().await;
        self.calls.borrow_mut().push(Call::List(owner.to_string()));
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        let mut listings = self.listings.borrow_mut();
        if listings.len() > 1 {
            listings.pop_front().expect("non-empty script")
        } else {
            listings.front().cloned().expect("script must hold at least one listing")
        }
    }
}

impl InstanceCommander for ScriptedGateway {
    async fn start(&self, id: &str) -> Result<(), GatewayError> {
        self.command(Call::Start(id.to_string())).await
    }

    async fn stop(&self, id: &str) -> Result<(), GatewayError> {
        self.command(Call::Stop(id.to_string())).await
    }

    async fn terminate(&self, id: &str) -> Result<(), GatewayError> {
        self.command(Call::Terminate(id.to_string())).await
    }
}

impl InstanceTypeCatalog for ScriptedGateway {
    async fn describe_instance_type(
        &self,
        machine_type: &str,
    ) -> Result<InstanceTypeInfo, GatewayError> {
        tokio::task::yield_now().await;
        self.calls
            .borrow_mut()
            .push(Call::DescribeType(machine_type.to_string()));
        self.catalog.clone().ok_or_else(|| {
            GatewayError::api("InvalidParameterValue", "unknown instance type")
        })
    }
}
