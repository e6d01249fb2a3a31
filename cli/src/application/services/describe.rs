//! Describe use-case: resolve an instance's machine type and summarise it.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use fleet_common::{Instance, InstanceTypeInfo};
use serde::Serialize;

use crate::application::ports::{InstanceLister, InstanceTypeCatalog};
use crate::application::services::dispatch::classify;
use crate::domain::describe::describe_instance_type;
use crate::domain::error::InstanceError;
use crate::domain::instance::find;
use crate::domain::ErrorKind;

/// An instance together with its machine-type capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceDescription {
    pub instance: Instance,
    pub capabilities: InstanceTypeInfo,
    pub summary: String,
}

/// Describe instance `id`.
///
/// `known` is the last published listing; the gateway is only asked for a
/// fresh one when `id` is not in it.
///
/// # Errors
///
/// Returns `InvalidParameter` when the id is unknown or ambiguous, or the
/// classified gateway failure.
pub async fn describe_instance<G>(
    gateway: &G,
    owner: &str,
    known: &[Instance],
    id: &str,
) -> Result<InstanceDescription, ErrorKind>
where
    G: InstanceLister + InstanceTypeCatalog + ?Sized,
{
    let instance = match find(known, id) {
        Ok(instance) => instance.clone(),
        Err(_) => {
            let listing = gateway
                .list_instances(owner)
                .await
                .map_err(|e| classify(&e))?;
            find(&listing, id).map_err(not_found)?.clone()
        }
    };

    tracing::debug!(instance = id, machine_type = %instance.machine_type, "describing");
    let capabilities = gateway
        .describe_instance_type(&instance.machine_type)
        .await
        .map_err(|e| classify(&e))?;
    let summary = describe_instance_type(&instance.machine_type, &capabilities);

    Ok(InstanceDescription {
        instance,
        capabilities,
        summary,
    })
}

fn not_found(err: InstanceError) -> ErrorKind {
    ErrorKind::InvalidParameter(err.to_string())
}
