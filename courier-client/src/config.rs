//! # Client Configuration
//!
//! Everything needed to reach the courier service: where it lives ([`ServiceAddress`]),
//! how to secure the connection ([`TlsSettings`]) and the connection options
//! ([`ClientOptions`]).
//!
//! The environment is only consulted by the `from_env` constructors. The recognized
//! variables are `COURIER_SERVICE_HOST`, `COURIER_SERVICE_PORT`, `CERTS_PATH` and
//! `COURIER_SERVICE_TLS_DOMAIN`. Unset or empty variables fall back to the defaults.
use crate::{client::ClientOptions, tls::TlsSettings};
use std::{fmt, num::ParseIntError};

pub const DEFAULT_SERVICE_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVICE_PORT: u16 = 55051;
pub const SERVICE_HOST_ENV: &str = "COURIER_SERVICE_HOST";
pub const SERVICE_PORT_ENV: &str = "COURIER_SERVICE_PORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {source}")]
    InvalidPort {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },
}

/// Host and port of the courier service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    pub host: String,
    pub port: u16,
}

impl Default for ServiceAddress {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_HOST, DEFAULT_SERVICE_PORT)
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl ServiceAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(SERVICE_HOST_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_HOST.to_string());

        let port = match lookup(SERVICE_PORT_ENV).filter(|v| !v.is_empty()) {
            Some(value) => value.parse().map_err(|source| ConfigError::InvalidPort {
                var: SERVICE_PORT_ENV,
                value,
                source,
            })?,
            None => DEFAULT_SERVICE_PORT,
        };

        Ok(Self { host, port })
    }

    /// The TLS (`https`) URI of the service.
    pub fn uri(&self) -> Result<http::Uri, http::uri::InvalidUri> {
        format!("https://{self}").parse()
    }
}

/// Complete configuration of a courier client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub address: ServiceAddress,
    pub tls: TlsSettings,
    pub options: ClientOptions,
}

impl ClientConfig {
    /// Address and TLS settings from the environment, default [`ClientOptions`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            address: ServiceAddress::from_lookup(&lookup)?,
            tls: TlsSettings::from_lookup(&lookup),
            options: ClientOptions::default(),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }
}
