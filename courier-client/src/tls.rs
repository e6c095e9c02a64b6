//! # Transport Security
//!
//! Loads the PEM material of a TLS role (certificate, private key and the trusted
//! authority bundle) and turns it into a tonic [`ClientTlsConfig`] for mutual TLS.
//!
//! Files are resolved per role inside a certificates directory:
//!
//! * `{dir}/{role}.pem` - the role certificate.
//! * `{dir}/{role}-key.pem` - the role private key.
//! * `{dir}/ca.pem` - the trusted certificate authority.
use std::{
    fs,
    path::{Path, PathBuf},
};
use tonic::transport::{Certificate, ClientTlsConfig, Identity};
use tracing::debug;

/// Role used by the courier client when loading its certificates.
pub const CLIENT_ROLE: &str = "client";
pub const DEFAULT_CERTS_PATH: &str = "certs";
pub const CERTS_PATH_ENV: &str = "CERTS_PATH";
pub const TLS_DOMAIN_ENV: &str = "COURIER_SERVICE_TLS_DOMAIN";

const CA_FILE: &str = "ca.pem";

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to read {what} from '{}': {source}", .path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Locations of the PEM files used to secure the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub ca_path: PathBuf,
    /// Overrides the server name checked against the server certificate.
    /// Defaults to the host of the target address.
    pub domain_name: Option<String>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self::for_role(DEFAULT_CERTS_PATH, CLIENT_ROLE)
    }
}

impl TlsSettings {
    pub fn for_role(dir: impl AsRef<Path>, role: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            cert_path: dir.join(format!("{role}.pem")),
            key_path: dir.join(format!("{role}-key.pem")),
            ca_path: dir.join(CA_FILE),
            domain_name: None,
        }
    }

    /// Client role settings, with the directory taken from `CERTS_PATH` and the
    /// server name override from `COURIER_SERVICE_TLS_DOMAIN`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dir = lookup(CERTS_PATH_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CERTS_PATH.to_string());

        let mut settings = Self::for_role(dir, CLIENT_ROLE);
        settings.domain_name = lookup(TLS_DOMAIN_ENV).filter(|v| !v.is_empty());
        settings
    }

    #[must_use]
    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }

    /// Reads the PEM files and builds the client TLS configuration.
    pub fn load(&self) -> Result<ClientTlsConfig, TlsError> {
        let ca = read_pem(&self.ca_path, "CA certificate")?;
        let cert = read_pem(&self.cert_path, "client certificate")?;
        let key = read_pem(&self.key_path, "client private key")?;

        let mut config = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca))
            .identity(Identity::from_pem(cert, key));

        if let Some(domain) = &self.domain_name {
            config = config.domain_name(domain.clone());
        }

        debug!(
            cert = %self.cert_path.display(),
            ca = %self.ca_path.display(),
            "client TLS configured with mutual TLS"
        );

        Ok(config)
    }
}

fn read_pem(path: &Path, what: &'static str) -> Result<Vec<u8>, TlsError> {
    fs::read(path).map_err(|source| TlsError::Read {
        what,
        path: path.to_path_buf(),
        source,
    })
}
