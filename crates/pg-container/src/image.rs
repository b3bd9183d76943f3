//! Building the snapshot image.
//!

use core::{fmt, time::Duration};
use std::collections::HashMap;

use chrono::NaiveDateTime;
use futures::StreamExt;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::{
    archive::BuildContext,
    engine::{BuildRequest, ContainerEngine, EngineError},
    recipe::{DATABASE_BUILD_ARG, RECIPE_FILE_NAME},
};

/// The name and tag of a built image, `<database>-<YYYY-MM-DD-HHMM>:latest`.
///
/// Only unique to the minute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference(String);

impl ImageReference {
    /// The reference for a snapshot of `database_name` built at `built_at`.
    pub fn generate(database_name: &str, built_at: NaiveDateTime) -> Self {
        Self(format!(
            "{database_name}-{}:latest",
            built_at.format("%Y-%m-%d-%H%M")
        ))
    }

    /// The reference as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build an image from `context` and wait for the build to finish.
///
/// The database name is passed to the recipe as the `DB_NAME` build argument. The build response
/// is drained to completion within `deadline`; errors reported in it fail the build once it ends.
pub async fn build_image<E: ContainerEngine + ?Sized>(
    engine: &E,
    context: BuildContext,
    database_name: &str,
    built_at: NaiveDateTime,
    deadline: Duration,
) -> Result<ImageReference, BuildError> {
    let image = ImageReference::generate(database_name, built_at);

    let request = BuildRequest {
        tag: image.as_str().to_string(),
        dockerfile: RECIPE_FILE_NAME.to_string(),
        build_args: HashMap::from([(
            DATABASE_BUILD_ARG.to_string(),
            database_name.to_string(),
        )]),
        remove_intermediate: true,
        force_remove_intermediate: true,
        context: context.into_bytes(),
    };

    let mut stream = engine
        .build_image(request)
        .await
        .map_err(BuildError::Engine)?
        .ok_or(BuildError::MissingResponse)?;

    let drain = async {
        let mut failure = None;

        while let Some(progress) = stream.next().await {
            let progress = progress.map_err(BuildError::Engine)?;

            if let Some(message) = progress.message {
                let message = message.trim_end();
                if !message.is_empty() {
                    debug!("{message}");
                }
            }

            if let Some(message) = progress.error {
                error!("{message}");
                failure.get_or_insert(message);
            }
        }

        Ok::<_, BuildError>(failure)
    };

    let failure = timeout(deadline, drain)
        .await
        .map_err(|_| BuildError::Timeout(deadline))??;

    if let Some(message) = failure {
        return Err(BuildError::Failed(message));
    }

    info!("Image built successfully with name: {image}");

    Ok(image)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to build image:\n{0}")]
    Engine(#[source] EngineError),

    #[error("Unknown error occurred when building docker image: the engine returned no response")]
    MissingResponse,

    #[error("Image build failed: {0}")]
    Failed(String),

    #[error("Image build did not finish within {0:?}")]
    Timeout(Duration),
}
