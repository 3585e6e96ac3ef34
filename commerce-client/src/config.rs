//! Client configuration

use std::sync::Arc;

use crate::dump::DumpHooks;

/// Configuration for the commerce client
///
/// The client is meant to be built once from this and shared; per-pass
/// construction would throw away the connection pool.
#[derive(Clone)]
pub struct ClientConfig {
    /// Service base URL (e.g. "https://order.example.com")
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Optional request/response dump hooks for debugging
    pub dump: Option<Arc<dyn DumpHooks>>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 15,
            dump: None,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Install dump hooks around the HTTP call path
    pub fn with_dump(mut self, hooks: Arc<dyn DumpHooks>) -> Self {
        self.dump = Some(hooks);
        self
    }

    /// Build a client from this configuration
    pub fn build(&self) -> crate::ClientResult<crate::Client> {
        crate::Client::new(self)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("dump", &self.dump.is_some())
            .finish()
    }
}
