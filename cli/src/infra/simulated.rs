//! In-memory control plane used by `--simulate` and the end-to-end tests.
//!
//! A command puts the instance into its transitional state. Each listing then
//! counts down the transition and, once the countdown is spent, moves the
//! instance to the command's end state.

use std::sync::{Mutex, PoisonError};

use fleet_common::{GpuInfo, Instance, InstanceState, InstanceTypeInfo};

use crate::application::ports::{InstanceCommander, InstanceLister, InstanceTypeCatalog};
use crate::domain::GatewayError;

/// Listings a transition stays visible before it completes.
pub const DEFAULT_SETTLE_POLLS: u32 = 1;

struct Transition {
    target: InstanceState,
    remaining: u32,
}

struct Slot {
    instance: Instance,
    transition: Option<Transition>,
}

pub struct SimulatedGateway {
    slots: Mutex<Vec<Slot>>,
    settle_polls: u32,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(demo_instances())
    }
}

impl SimulatedGateway {
    #[must_use]
    pub fn new(instances: Vec<Instance>) -> Self {
        let slots = instances
            .into_iter()
            .map(|instance| Slot {
                instance,
                transition: None,
            })
            .collect();
        Self {
            slots: Mutex::new(slots),
            settle_polls: DEFAULT_SETTLE_POLLS,
        }
    }

    #[must_use]
    pub fn with_settle_polls(mut self, settle_polls: u32) -> Self {
        self.settle_polls = settle_polls;
        self
    }

    fn apply(&self, id: &str, verb: &str) -> Result<(), GatewayError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .iter_mut()
            .find(|s| s.instance.id == id)
            .ok_or_else(|| {
                GatewayError::api(
                    "InvalidInstanceID.NotFound",
                    &format!("The instance ID '{id}' does not exist"),
                )
            })?;

        let current = slot.instance.state;
        let (via, target) = match (verb, current) {
            (_, InstanceState::Terminated | InstanceState::ShuttingDown) => {
                return Err(incorrect_state(id, current, verb));
            }
            ("start", InstanceState::Running | InstanceState::Pending)
            | ("stop", InstanceState::Stopped | InstanceState::Stopping) => return Ok(()),
            ("start", InstanceState::Stopped) => (InstanceState::Pending, InstanceState::Running),
            ("stop", InstanceState::Running | InstanceState::Pending) => {
                (InstanceState::Stopping, InstanceState::Stopped)
            }
            ("terminate", _) => (InstanceState::ShuttingDown, InstanceState::Terminated),
            _ => return Err(incorrect_state(id, current, verb)),
        };

        tracing::debug!(instance = id, from = %current, to = %target, "simulated transition");
        slot.instance.state = via;
        slot.transition = Some(Transition {
            target,
            remaining: self.settle_polls,
        });
        Ok(())
    }
}

fn incorrect_state(id: &str, state: InstanceState, verb: &str) -> GatewayError {
    GatewayError::api(
        "IncorrectInstanceState",
        &format!("The instance '{id}' is in state '{state}' and cannot {verb}"),
    )
}

impl InstanceLister for SimulatedGateway {
    async fn list_instances(&self, _owner: &str) -> Result<Vec<Instance>, GatewayError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        for slot in slots.iter_mut() {
            let Some(transition) = slot.transition.as_mut() else {
                continue;
            };
            if transition.remaining == 0 {
                slot.instance.state = transition.target;
                slot.transition = None;
            } else {
                transition.remaining -= 1;
            }
        }
        Ok(slots.iter().map(|s| s.instance.clone()).collect())
    }
}

impl InstanceCommander for SimulatedGateway {
    async fn start(&self, id: &str) -> Result<(), GatewayError> {
        self.apply(id, "start")
    }

    async fn stop(&self, id: &str) -> Result<(), GatewayError> {
        self.apply(id, "stop")
    }

    async fn terminate(&self, id: &str) -> Result<(), GatewayError> {
        self.apply(id, "terminate")
    }
}

impl InstanceTypeCatalog for SimulatedGateway {
    async fn describe_instance_type(
        &self,
        machine_type: &str,
    ) -> Result<InstanceTypeInfo, GatewayError> {
        catalog_entry(machine_type).ok_or_else(|| {
            GatewayError::api(
                "InvalidParameterValue",
                &format!("Unknown instance type '{machine_type}'"),
            )
        })
    }
}

fn demo(
    id: &str,
    name: &str,
    platform: &str,
    os: &str,
    ip: &str,
    state: InstanceState,
    machine_type: &str,
) -> Instance {
    Instance {
        id: id.to_string(),
        name: name.to_string(),
        platform: platform.to_string(),
        os: os.to_string(),
        ip: ip.to_string(),
        state,
        machine_type: machine_type.to_string(),
        image_ref: "ami-12345".to_string(),
    }
}

/// The four machines every simulated session starts with.
#[must_use]
#[rustfmt::skip]
pub fn demo_instances() -> Vec<Instance> {
    vec![
        demo("i-abcdef123456789", "Dev Machine", "Linux/UNIX", "Amazon Linux", "172.168.3.34", InstanceState::Running, "c7g.16xlarge"),
        demo("i-987654321fedcba", "Blue Screen", "Windows", "Windows", "193.27.17.54", InstanceState::Stopped, "t3a.xlarge"),
        demo("i-000000000000000", "VPN Server", "Linux/UNIX", "Ubuntu", "54.34.2.123", InstanceState::Terminated, "t4g.nano"),
        demo("i-9876543210abcde", "Dev Server", "Linux/UNIX", "macOS", "54.147.0.194", InstanceState::Running, "mac2.metal"),
    ]
}

fn catalog_entry(machine_type: &str) -> Option<InstanceTypeInfo> {
    let (arch, vcpus, cores, threads, ghz, memory_mib, network) = match machine_type {
        "c7g.16xlarge" => ("arm64", 64, 64, 1, Some(2.6), 131_072, "30 Gigabit"),
        "t3a.xlarge" => ("x86_64", 4, 2, 2, Some(2.2), 16_384, "Up to 5 Gigabit"),
        "t4g.nano" => ("arm64", 2, 2, 1, Some(2.5), 512, "Up to 5 Gigabit"),
        "mac2.metal" => ("arm64_mac", 8, 8, 1, Some(3.2), 16_384, "10 Gigabit"),
        "g4dn.xlarge" => ("x86_64", 4, 2, 2, Some(2.5), 16_384, "Up to 25 Gigabit"),
        _ => return None,
    };
    let gpus = if machine_type.starts_with("g4dn") {
        vec![GpuInfo {
            count: 1,
            manufacturer: "NVIDIA".to_string(),
            name: "T4".to_string(),
            memory_mib: 16_384,
        }]
    } else {
        Vec::new()
    };
    Some(InstanceTypeInfo {
        architectures: vec![arch.to_string()],
        vcpus,
        cores,
        threads_per_core: threads,
        clock_speed_ghz: ghz,
        memory_mib,
        gpus,
        network_performance: network.to_string(),
    })
}
