use core::fmt::{self, Display};

use crate::pipeline::Stage;

/// Holds the context for the current snapshot. Used for prefixing logs.
#[derive(Debug)]
pub struct Context {
    /// The database being snapshotted.
    pub database: String,

    /// The last stage the snapshot reached.
    pub stage: Stage,
}

impl Context {
    /// A context for a snapshot of `database` that has not started.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            stage: Stage::Start,
        }
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{:?}] ", self.database, self.stage)
    }
}
