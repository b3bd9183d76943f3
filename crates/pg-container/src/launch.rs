//! Launching a container from the snapshot image.
//!

use thiserror::Error;
use tracing::info;

use crate::{
    config::ContainerConfig,
    engine::{ContainerEngine, ContainerRequest, EngineError},
    image::ImageReference,
};

/// A container created and started from a snapshot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedContainer {
    /// The container name.
    pub name: String,

    /// The id the engine assigned to the container.
    pub id: String,
}

/// The container name for a snapshot of `database_name`, `<prefix><database>-<unix seconds>`.
pub fn container_name(prefix: &str, database_name: &str, unix_seconds: i64) -> String {
    format!("{prefix}{database_name}-{unix_seconds}")
}

/// Create and start a container from `image`, publishing the service port on the host.
pub async fn launch_container<E: ContainerEngine + ?Sized>(
    engine: &E,
    config: &ContainerConfig,
    image: &ImageReference,
    database_name: &str,
    unix_seconds: i64,
) -> Result<LaunchedContainer, LaunchError> {
    let name = container_name(&config.name_prefix, database_name, unix_seconds);

    let request = ContainerRequest {
        name: name.clone(),
        image: image.as_str().to_string(),
        env: Vec::new(),
        exposed_port: format!("{}/tcp", config.service_port),
        host_ip: config.host_ip.to_string(),
        host_port: config.host_port.to_string(),
    };

    let id = engine
        .create_container(&request)
        .await
        .map_err(LaunchError::Create)?;
    info!("Container created with name: {name}");

    engine
        .start_container(&id)
        .await
        .map_err(LaunchError::Start)?;
    info!(
        "Container started, listening on {}:{}",
        config.host_ip, config.host_port
    );

    Ok(LaunchedContainer { name, id })
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to create container:\n{0}")]
    Create(#[source] EngineError),

    #[error("Failed to start container:\n{0}")]
    Start(#[source] EngineError),
}
