//! Transport configuration.

use std::time::Duration;

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server endpoint, e.g. `ws://127.0.0.1:5000/ws`.
    pub url: String,

    /// How long a connection attempt may take before it is reported as
    /// [`TransportError::ConnectTimeout`](crate::TransportError::ConnectTimeout).
    ///
    /// Default: 10 seconds.
    pub connect_timeout: Duration,
}

impl TransportConfig {
    /// Creates a config for the given endpoint with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
