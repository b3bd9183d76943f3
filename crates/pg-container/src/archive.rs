//! Packing the build context.
//!

use core::num::TryFromIntError;
use std::io;

use tar::{Builder, EntryType, Header};
use thiserror::Error;

use crate::{
    dump::DumpPayload,
    recipe::{RECIPE_FILE_NAME, Recipe},
};

/// The file name of the dump within the build context.
pub const DUMP_FILE_NAME: &str = "dump.sql";

/// Mode of the dump entry. Readable by whichever user the build runs as.
pub const DUMP_FILE_MODE: u32 = 0o777;

/// Mode of the recipe entry.
pub const RECIPE_FILE_MODE: u32 = 0o600;

/// A finalized tar archive to hand to the build engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    bytes: Vec<u8>,
}

impl BuildContext {
    /// The archive bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the context returning the archive bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Pack the dump and recipe into a tar archive.
///
/// The dump is written first as [`DUMP_FILE_NAME`], followed by the recipe as
/// [`RECIPE_FILE_NAME`]. The archive is finished before it is returned.
pub fn pack(recipe: &Recipe, dump: &DumpPayload) -> Result<BuildContext, ArchiveError> {
    let mut builder = Builder::new(Vec::new());

    append_file(&mut builder, DUMP_FILE_NAME, DUMP_FILE_MODE, dump.as_bytes())?;
    append_file(&mut builder, RECIPE_FILE_NAME, RECIPE_FILE_MODE, recipe.as_bytes())?;

    let bytes = builder
        .into_inner()
        .map_err(|e| ArchiveError::Io(e, "finish archive"))?;

    Ok(BuildContext { bytes })
}

fn append_file(
    builder: &mut Builder<Vec<u8>>,
    name: &'static str,
    mode: u32,
    contents: &[u8],
) -> Result<(), ArchiveError> {
    let size = u64::try_from(contents.len())?;

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);
    header.set_mode(mode);

    builder
        .append_data(&mut header, name, contents)
        .map_err(|e| ArchiveError::Write(e, name))?;

    Ok(())
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to write '{1}' to the archive:\n{0}")]
    Write(#[source] io::Error, &'static str),

    #[error("Failed to {1}:\n{0}")]
    Io(#[source] io::Error, &'static str),

    #[error("Entry was larger than u64::MAX: {0}")]
    TooLarge(#[from] TryFromIntError),
}
