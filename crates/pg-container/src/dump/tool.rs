use core::time::Duration;
use std::{
    fs::OpenOptions,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{process::Command, time::timeout};
use tracing::{debug, error};

use super::{DumpError, DumpPayload, DumpProducer};

/// The file name the embedded dump tool is written to.
pub const DUMP_TOOL_FILE_NAME: &str = "pg_dump";

/// An external dump executable, run once per dump with the connection URL as its only argument.
#[derive(Debug, Clone)]
pub struct DumpTool {
    /// The path to the executable.
    pub path: PathBuf,

    /// How long the tool may run before it is killed.
    pub timeout: Duration,
}

impl DumpTool {
    /// Create a dump tool for the executable at `path`.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DumpProducer for DumpTool {
    async fn produce(&self, connection_url: &str) -> Result<DumpPayload, DumpError> {
        debug!("Running {:?}", self.path);

        let child = Command::new(&self.path)
            .arg(connection_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(DumpError::RunCommand)?;

        // Dropping the child on timeout kills it.
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DumpError::Timeout(self.timeout))?
            .map_err(DumpError::RunCommand)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            error!("{}", stderr.trim_end());

            return Err(DumpError::CommandErrored {
                status: output.status,
                stderr,
            });
        }

        Ok(DumpPayload::new(output.stdout))
    }
}

/// Write `contents` to an executable file named [`DUMP_TOOL_FILE_NAME`] in `directory`.
///
/// An existing file at that path is left untouched. Returns the path of the tool.
pub fn materialize(directory: &Path, contents: &[u8]) -> Result<PathBuf, MaterializeError> {
    let path = directory.join(DUMP_TOOL_FILE_NAME);

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    let mut file = match options.open(&path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            debug!("Dump tool already exists at {path:?}");
            return Ok(path);
        }
        Err(error) => return Err(MaterializeError::Io(error, "create dump tool file")),
    };

    file.write_all(contents)
        .map_err(|e| MaterializeError::Io(e, "write dump tool"))?;
    drop(file);

    // The creation mode is subject to the umask.
    #[cfg(unix)]
    {
        use std::{fs, os::unix::fs::PermissionsExt};
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .map_err(|e| MaterializeError::Io(e, "set dump tool permissions"))?;
    }

    debug!("Wrote dump tool to {path:?}");

    Ok(path)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Failed to {1}:\n{0}")]
    Io(#[source] io::Error, &'static str),
}
