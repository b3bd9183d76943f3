//! Producing a logical dump of the database.
//!

use core::time::Duration;
use std::{io, process::ExitStatus};

use async_trait::async_trait;
use thiserror::Error;

mod tool;

pub use tool::{DUMP_TOOL_FILE_NAME, DumpTool, MaterializeError, materialize};

/// The dump tool embedded at build time from the file named by `PG_CONTAINER_DUMP_TOOL`.
#[cfg(feature = "embedded-dump-tool")]
pub const EMBEDDED_DUMP_TOOL: &[u8] = include_bytes!(env!("PG_CONTAINER_DUMP_TOOL"));

/// The raw output of a dump tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpPayload {
    contents: Vec<u8>,
}

impl DumpPayload {
    /// Wrap captured dump bytes.
    pub fn new(contents: Vec<u8>) -> Self {
        Self { contents }
    }

    /// The dump contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.contents
    }

    /// The dump size in bytes.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// If the dump is empty.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Something that can produce a dump given a connection URL.
#[async_trait]
pub trait DumpProducer: Send + Sync {
    /// Produce a dump of the database at `connection_url`.
    async fn produce(&self, connection_url: &str) -> Result<DumpPayload, DumpError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Failed to run dump tool:\n{0}")]
    RunCommand(#[source] io::Error),

    /// `stderr` is logged when the tool fails.
    #[error("Dump tool exited with {status}")]
    CommandErrored { status: ExitStatus, stderr: String },

    #[error("Dump tool did not finish within {0:?}")]
    Timeout(Duration),
}
