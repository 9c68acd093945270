use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of workers.
pub const DEFAULT_THREAD_COUNT: usize = 8;

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "merkle-worker";

/// Tree construction settings.
///
/// `thread_count` only changes the degree of parallelism, never the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Number of workers draining the work queue.
    pub thread_count: usize,

    /// Prefix of the worker thread names, suffixed with the worker index.
    pub thread_name: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            thread_count: DEFAULT_THREAD_COUNT,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}

impl TreeConfig {
    /// Creates a config with `thread_count` workers.
    pub fn new(thread_count: usize) -> Self {
        TreeConfig {
            thread_count,
            ..Default::default()
        }
    }

    /// Sets the worker thread name prefix.
    pub fn with_thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Checks the settings before a pool is built.
    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 {
            return Err(Error::InvalidThreadCount);
        }
        Ok(())
    }
}
