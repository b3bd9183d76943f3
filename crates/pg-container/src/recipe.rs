//! The Dockerfile the image is built from.
//!

use std::{fs, io, path::Path};

use thiserror::Error;

/// The file name of the recipe within the build context.
pub const RECIPE_FILE_NAME: &str = "Dockerfile";

/// The build argument the recipe reads the database name from.
pub const DATABASE_BUILD_ARG: &str = "DB_NAME";

const EMBEDDED_RECIPE: &str = include_str!("../recipe/Dockerfile");

/// A Dockerfile that copies `dump.sql` into the Postgres init directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    contents: String,
}

impl Recipe {
    /// Create a recipe from Dockerfile contents.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Load a recipe from a Dockerfile on disk.
    pub fn load(path: &Path) -> Result<Self, LoadRecipeError> {
        let contents = fs::read_to_string(path).map_err(LoadRecipeError::Read)?;
        Ok(Self { contents })
    }

    /// The recipe contents.
    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::new(EMBEDDED_RECIPE)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadRecipeError {
    #[error("Failed to read the Dockerfile:\n{0}")]
    Read(#[source] io::Error),
}
