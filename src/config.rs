//! Server configuration.

use std::time::Duration;

/// Default server name, used in tracing spans.
pub const DEFAULT_SERVER_NAME: &str = "procwire";

/// Default duration after which a request is logged as slow.
pub const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

/// Configuration for a [`ProcedureServer`](crate::ProcedureServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name recorded on every dispatch span.
    pub name: String,
    /// Requests taking longer than this are logged at `warn`.
    /// `None` disables the check.
    pub slow_request_threshold: Option<Duration>,
}

impl ServerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the slow request threshold.
    ///
    /// Default: 1 second
    pub fn slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_request_threshold = Some(threshold);
        self
    }

    /// Never log requests as slow.
    pub fn disable_slow_request_warning(mut self) -> Self {
        self.slow_request_threshold = None;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            slow_request_threshold: Some(DEFAULT_SLOW_REQUEST_THRESHOLD),
        }
    }
}
