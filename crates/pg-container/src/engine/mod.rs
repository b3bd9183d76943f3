//! The container engine images are built and run on.
//!

use core::time::Duration;
use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

mod docker;

pub use docker::DockerEngine;

/// A request to build an image from a tar build context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// The tag to give the built image.
    pub tag: String,

    /// The name of the Dockerfile within the context.
    pub dockerfile: String,

    /// Build arguments consumed by the Dockerfile.
    pub build_args: HashMap<String, String>,

    /// Remove intermediate containers after a successful build.
    pub remove_intermediate: bool,

    /// Always remove intermediate containers, even if the build fails.
    pub force_remove_intermediate: bool,

    /// The tar archive.
    pub context: Vec<u8>,
}

/// A single message from the build response stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProgress {
    /// Build output.
    pub message: Option<String>,

    /// An error reported by the build.
    pub error: Option<String>,
}

/// The streamed response of a build.
pub type BuildStream<'a> = BoxStream<'a, Result<BuildProgress, EngineError>>;

/// A request to create a container with a single published port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRequest {
    /// The container name.
    pub name: String,

    /// The image to create the container from.
    pub image: String,

    /// Environment variables in `KEY=value` form.
    pub env: Vec<String>,

    /// The exposed container port, e.g. `5432/tcp`.
    pub exposed_port: String,

    /// The host address the port is bound to.
    pub host_ip: String,

    /// The host port the container port is bound to.
    pub host_port: String,
}

/// The operations the pipeline needs from a container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Submit a build.
    ///
    /// `Ok(None)` means the engine accepted the call but returned no response stream.
    async fn build_image<'a>(
        &'a self,
        request: BuildRequest,
    ) -> Result<Option<BuildStream<'a>>, EngineError>;

    /// Create a container, returning its id.
    async fn create_container(&self, request: &ContainerRequest) -> Result<String, EngineError>;

    /// Start a created container.
    async fn start_container(&self, id: &str) -> Result<(), EngineError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Docker engine error:\n{0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("Engine did not respond to {1} within {0:?}")]
    Timeout(Duration, &'static str),
}
