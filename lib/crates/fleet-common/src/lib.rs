pub mod catalog;
pub mod instance;

pub use catalog::{GpuInfo, InstanceTypeInfo};
pub use instance::{DesiredState, Instance, InstanceState, ParseStateError};
