//! # Courier Client
//!
//! `courier-client` is a thin, TLS-secured gRPC client for the courier management
//! service. It exposes the five operations of the `courier.v1.Couriers` contract:
//! register, update, get, search and delete.
//!
//! ## Key Components
//!
//! * **[`CourierClient`]:** Owns the connection and forwards one typed request per call,
//!   bounded by a timeout and tagged with the caller identifier.
//! * **[`ClientConfig`]:** Target address, TLS material and [`ClientOptions`]. Can be
//!   built from the environment with [`ClientConfig::from_env`].
//! * **[`TlsSettings`]:** Loads the client certificate, key and CA bundle and derives the
//!   transport credentials.
//!
//! ## Errors
//!
//! Setting up or closing a client fails with a [`ClientError`]. Remote calls fail with the
//! [`tonic::Status`] returned by the transport or the server, unchanged.
//!
//! ## Logging
//!
//! Failures are reported through `tracing`. Installing a subscriber is left to the
//! application.
//!
//! ## Re-exports
//!
//! This crate re-exports the generated message types as [`pb`] and `tonic` to ensure that
//! consumers use compatible versions.
pub mod client;
pub mod config;
pub mod tls;

pub use client::{CallOptions, ClientError, ClientOptions, CourierClient};
pub use config::{ClientConfig, ConfigError, ServiceAddress};
pub use tls::{TlsError, TlsSettings};

// Re-exports
pub use courier_api::pb;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
