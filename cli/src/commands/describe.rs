//! `fleet describe`: show an instance and its machine-type capabilities.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::ControlPlane;
use crate::application::services::FleetController;
use crate::domain::validate_instance_id;

/// Run `fleet describe <id>`.
///
/// # Errors
///
/// Returns the classified failure when the instance or its machine type
/// cannot be resolved.
pub async fn run<G: ControlPlane>(
    app: &AppContext,
    controller: &FleetController<G>,
    id: &str,
) -> Result<ExitCode> {
    validate_instance_id(id)?;
    let description = controller.describe_instance(id).await?;
    app.renderer().render_description(&description)?;
    Ok(ExitCode::SUCCESS)
}
