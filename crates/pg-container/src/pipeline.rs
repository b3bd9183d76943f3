//! The snapshot pipeline: dump, pack, build, and optionally launch.
//!

use chrono::{Local, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    archive::{self, ArchiveError},
    config::{BuildConfig, Config, ContainerConfig},
    connection::{ConnectionDescriptor, ParseConnectionError},
    context::Context,
    dump::{DumpError, DumpProducer},
    engine::ContainerEngine,
    image::{BuildError, ImageReference, build_image},
    launch::{LaunchError, LaunchedContainer, launch_container},
    recipe::Recipe,
};

/// The stages a snapshot moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Nothing has been done yet.
    Start,

    /// The dump has been captured.
    DumpCaptured,

    /// The build context has been packed.
    ArchiveBuilt,

    /// The image has been built.
    ImageBuilt,

    /// A container has been created and started from the image.
    ContainerStarted,

    /// The snapshot finished.
    Done,
}

/// The result of a successful snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    /// The database that was snapshotted.
    pub database_name: String,

    /// The built image.
    pub image: ImageReference,

    /// The container launched from the image, if one was requested.
    pub container: Option<LaunchedContainer>,
}

/// Turns a live database into an image using a dump producer and a container engine.
#[derive(Debug)]
pub struct Pipeline<D, E> {
    dump: D,
    engine: E,
    recipe: Recipe,
    build: BuildConfig,
    container: ContainerConfig,
}

impl<D: DumpProducer, E: ContainerEngine> Pipeline<D, E> {
    /// Create a pipeline.
    pub fn new(dump: D, engine: E, recipe: Recipe, config: &Config) -> Self {
        Self {
            dump,
            engine,
            recipe,
            build: config.build.clone(),
            container: config.container.clone(),
        }
    }

    /// The dump producer.
    pub fn dump(&self) -> &D {
        &self.dump
    }

    /// The container engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Snapshot the database at `connection_url`, launching a container from the image if
    /// `launch` is set.
    ///
    /// Stops at the first failure. Nothing produced before the failure is cleaned up.
    pub async fn run(
        &self,
        connection_url: &str,
        launch: bool,
    ) -> Result<SnapshotReport, SnapshotError> {
        let descriptor = ConnectionDescriptor::parse(connection_url)?;
        let database_name = descriptor.database_name();
        let mut context = Context::new(database_name);

        info!("{context}Step 1: Processing dump");
        let dump = self.dump.produce(connection_url).await?;
        context.stage = Stage::DumpCaptured;
        debug!("{context}Captured {} bytes", dump.len());

        let build_context = archive::pack(&self.recipe, &dump)?;
        drop(dump);
        context.stage = Stage::ArchiveBuilt;
        debug!("{context}Packed {} byte build context", build_context.as_bytes().len());

        info!("{context}Step 2: Creating Docker image");
        let image = build_image(
            &self.engine,
            build_context,
            database_name,
            Local::now().naive_local(),
            self.build.timeout(),
        )
        .await?;
        context.stage = Stage::ImageBuilt;

        let container = if launch {
            info!("{context}Step 3: Creating a container");
            let container = launch_container(
                &self.engine,
                &self.container,
                &image,
                database_name,
                Utc::now().timestamp(),
            )
            .await
            .map_err(|source| SnapshotError::Launch {
                image: image.clone(),
                source,
            })?;
            context.stage = Stage::ContainerStarted;

            Some(container)
        } else {
            None
        };

        context.stage = Stage::Done;
        debug!("{context}Snapshot complete");

        Ok(SnapshotReport {
            database_name: database_name.to_string(),
            image,
            container,
        })
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid connection URL:\n{0}")]
    Connection(#[from] ParseConnectionError),

    #[error("Failed to dump the database:\n{0}")]
    Dump(#[from] DumpError),

    #[error("Failed to pack the build context:\n{0}")]
    Archive(#[from] ArchiveError),

    #[error("Failed to build the image:\n{0}")]
    Build(#[from] BuildError),

    #[error("Image '{image}' was built but the container could not be launched:\n{source}")]
    Launch {
        image: ImageReference,
        #[source]
        source: LaunchError,
    },
}

impl SnapshotError {
    /// The last stage the snapshot completed before failing.
    pub fn completed_stage(&self) -> Stage {
        match self {
            Self::Connection(_) | Self::Dump(_) => Stage::Start,
            Self::Archive(_) => Stage::DumpCaptured,
            Self::Build(_) => Stage::ArchiveBuilt,
            Self::Launch { .. } => Stage::ImageBuilt,
        }
    }

    /// The image built before the failure, if any.
    pub fn built_image(&self) -> Option<&ImageReference> {
        match self {
            Self::Launch { image, .. } => Some(image),
            _ => None,
        }
    }
}
