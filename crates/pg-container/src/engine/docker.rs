use core::time::Duration;
use std::collections::HashMap;

use async_trait::async_trait;
use bollard::{
    Docker,
    container::{Config, CreateContainerOptions, StartContainerOptions},
    image::BuildImageOptions,
    models::{HostConfig, PortBinding},
};
use bytes::Bytes;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::warn;

use super::{
    BuildProgress, BuildRequest, BuildStream, ContainerEngine, ContainerRequest, EngineError,
};

/// A Docker engine reached through the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
    call_timeout: Duration,
}

impl DockerEngine {
    /// Connect to the engine named by `DOCKER_HOST`, or the local socket if unset.
    ///
    /// `call_timeout` bounds each container create and start call.
    pub fn connect(call_timeout: Duration) -> Result<Self, EngineError> {
        let docker = Docker::connect_with_defaults()?;

        Ok(Self {
            docker,
            call_timeout,
        })
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build_image<'a>(
        &'a self,
        request: BuildRequest,
    ) -> Result<Option<BuildStream<'a>>, EngineError> {
        let options = build_options(&request);

        let stream = self
            .docker
            .build_image(options, None, Some(Bytes::from(request.context)))
            .map(|item| {
                item.map(|info| BuildProgress {
                    message: info.stream.or(info.status),
                    error: info.error,
                })
                .map_err(EngineError::from)
            });

        Ok(Some(stream.boxed()))
    }

    async fn create_container(&self, request: &ContainerRequest) -> Result<String, EngineError> {
        let options = CreateContainerOptions {
            name: request.name.clone(),
            platform: None,
        };

        let config = container_config(request);

        let response = timeout(
            self.call_timeout,
            self.docker.create_container(Some(options), config),
        )
        .await
        .map_err(|_| EngineError::Timeout(self.call_timeout, "container create"))??;

        for warning in &response.warnings {
            warn!("Engine warning for '{}': {warning}", request.name);
        }

        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        timeout(
            self.call_timeout,
            self.docker
                .start_container(id, None::<StartContainerOptions<String>>),
        )
        .await
        .map_err(|_| EngineError::Timeout(self.call_timeout, "container start"))??;

        Ok(())
    }
}

/// The build options for a request. The build context is sent separately.
fn build_options(request: &BuildRequest) -> BuildImageOptions<String> {
    BuildImageOptions {
        dockerfile: request.dockerfile.clone(),
        t: request.tag.clone(),
        rm: request.remove_intermediate,
        forcerm: request.force_remove_intermediate,
        buildargs: request.build_args.clone(),
        ..BuildImageOptions::default()
    }
}

/// The container config for a request, publishing the exposed port on the host.
fn container_config(request: &ContainerRequest) -> Config<String> {
    let port_bindings = HashMap::from([(
        request.exposed_port.clone(),
        Some(vec![PortBinding {
            host_ip: Some(request.host_ip.clone()),
            host_port: Some(request.host_port.clone()),
        }]),
    )]);

    Config {
        image: Some(request.image.clone()),
        env: Some(request.env.clone()),
        exposed_ports: Some(HashMap::from([(
            request.exposed_port.clone(),
            HashMap::new(),
        )])),
        host_config: Some(HostConfig {
            port_bindings: Some(port_bindings),
            ..HostConfig::default()
        }),
        ..Config::default()
    }
}
