//! # pg-container
//! Make a re-usable Docker image from a live Postgres database.
//!

pub mod archive;
pub mod config;
pub mod connection;
mod context;
pub mod dump;
pub mod engine;
pub mod image;
pub mod launch;
mod logger;
pub mod pipeline;
pub mod recipe;

pub use config::{Config, LoadConfigError};
pub use context::Context;
pub use logger::{LoggerError, init_logger};
pub use pipeline::{Pipeline, SnapshotError, SnapshotReport, Stage};
