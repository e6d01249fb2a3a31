use serde::{Deserialize, Serialize};

/// Capability record for one machine type, as returned by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct InstanceTypeInfo {
    /// Supported CPU architectures, e.g. `x86_64`, `arm64`, `arm64_mac`.
    pub architectures: Vec<String>,
    pub vcpus: u32,
    pub cores: u32,
    pub threads_per_core: u32,
    /// Sustained clock speed in GHz, when published.
    pub clock_speed_ghz: Option<f64>,
    pub memory_mib: u64,
    pub gpus: Vec<GpuInfo>,
    /// Free-form bandwidth class, e.g. `Up to 12.5 Gigabit`.
    pub network_performance: String,
}

/// One GPU model attached to a machine type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GpuInfo {
    pub count: u32,
    pub manufacturer: String,
    pub name: String,
    pub memory_mib: u64,
}
