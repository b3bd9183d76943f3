//! # common
//!
#![allow(dead_code, missing_docs)]

use core::time::Duration;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use pg_container::{
    dump::{DumpError, DumpPayload, DumpProducer},
    engine::{
        BuildProgress, BuildRequest, BuildStream, ContainerEngine, ContainerRequest, EngineError,
    },
};

/// A dump producer that always returns the same bytes.
pub struct StubDump {
    pub contents: Vec<u8>,
    pub connection_urls: Mutex<Vec<String>>,
}

impl StubDump {
    pub fn new(contents: &[u8]) -> Self {
        Self {
            contents: contents.to_vec(),
            connection_urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DumpProducer for StubDump {
    async fn produce(&self, connection_url: &str) -> Result<DumpPayload, DumpError> {
        self.connection_urls
            .lock()
            .unwrap()
            .push(connection_url.to_string());
        Ok(DumpPayload::new(self.contents.clone()))
    }
}

/// How the recording engine responds to a build.
pub enum BuildBehaviour {
    Stream(Vec<Result<BuildProgress, ()>>),
    Error,
    NoStream,
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(BuildRequest),
    Create(ContainerRequest),
    Start(String),
}

/// An engine that records every call made to it.
pub struct RecordingEngine {
    pub build: BuildBehaviour,
    pub fail_create: bool,
    pub fail_start: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingEngine {
    pub fn new(build: BuildBehaviour) -> Self {
        Self {
            build,
            fail_create: false,
            fail_start: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(BuildBehaviour::Stream(vec![
            Ok(progress("Step 1/6 : FROM postgres:16-alpine\n")),
            Ok(progress("Successfully built 0123456789ab\n")),
        ]))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn build_requests(&self) -> Vec<BuildRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Build(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

pub fn progress(message: &str) -> BuildProgress {
    BuildProgress {
        message: Some(message.to_string()),
        error: None,
    }
}

pub fn engine_error() -> EngineError {
    EngineError::Timeout(Duration::from_secs(1), "test")
}

#[async_trait]
impl ContainerEngine for RecordingEngine {
    async fn build_image<'a>(
        &'a self,
        request: BuildRequest,
    ) -> Result<Option<BuildStream<'a>>, EngineError> {
        self.calls.lock().unwrap().push(Call::Build(request));

        match &self.build {
            BuildBehaviour::Stream(items) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|item| item.clone().map_err(|_| engine_error()))
                    .collect();
                Ok(Some(stream::iter(items).boxed()))
            }
            BuildBehaviour::Error => Err(engine_error()),
            BuildBehaviour::NoStream => Ok(None),
            BuildBehaviour::Hang => Ok(Some(stream::pending().boxed())),
        }
    }

    async fn create_container(&self, request: &ContainerRequest) -> Result<String, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(request.clone()));

        if self.fail_create {
            return Err(engine_error());
        }

        Ok(format!("id-{}", request.name))
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(Call::Start(id.to_string()));

        if self.fail_start {
            return Err(engine_error());
        }

        Ok(())
    }
}

/// The entries of a tar archive as `(path, mode, declared size, contents)`.
pub fn read_entries(bytes: &[u8]) -> Vec<(String, u32, u64, Vec<u8>)> {
    let mut archive = tar::Archive::new(bytes);

    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mode = entry.header().mode().unwrap();
            let size = entry.header().size().unwrap();

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();

            (path, mode, size, contents)
        })
        .collect()
}

/// Write an executable shell script named `name` to `directory`.
#[cfg(unix)]
pub fn stub_script(directory: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = directory.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    path
}
