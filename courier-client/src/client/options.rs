//! # Client & Call Options
//!
//! [`ClientOptions`] are fixed when a [`super::CourierClient`] is built and shared by
//! every call it makes. [`CallOptions`] tune a single call.
use std::time::Duration;

pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection-wide settings of a courier client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Upper bound for establishing the TCP + TLS connection.
    pub dial_timeout: Duration,
    /// Interval between HTTP/2 keep-alive pings.
    pub keep_alive_interval: Duration,
    /// How long to wait for a keep-alive ping acknowledgement.
    pub keep_alive_timeout: Duration,
    /// Upper bound for a single remote call, unless overridden per call.
    pub call_timeout: Duration,
    /// Identifier sent as `service-client` metadata on every call.
    pub caller: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            keep_alive_timeout: DEFAULT_KEEP_ALIVE_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            caller: None,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_keep_alive(mut self, interval: Duration, timeout: Duration) -> Self {
        self.keep_alive_interval = interval;
        self.keep_alive_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the caller identifier. An empty string clears it.
    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        let caller = caller.into();
        self.caller = (!caller.is_empty()).then_some(caller);
        self
    }

    /// The configured caller identifier, ignoring empty strings.
    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref().filter(|c| !c.is_empty())
    }
}

/// Per-call settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Replaces [`ClientOptions::call_timeout`] for this call.
    pub timeout: Option<Duration>,
    /// Extra metadata (headers) to attach to the request.
    pub headers: Vec<(String, String)>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}
