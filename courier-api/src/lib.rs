//! # Courier API
//!
//! Generated bindings for the `courier.v1.Couriers` gRPC contract.
//!
//! The client stub is what `courier-client` wraps. The server half is compiled
//! as well so the contract can be served in-process, which is how the client's
//! integration tests exercise it.

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/courier.v1.rs"));
}

pub use pb::couriers_client::CouriersClient;
pub use pb::couriers_server::{Couriers, CouriersServer};

/// Fully qualified name of the courier service.
pub const SERVICE_NAME: &str = "courier.v1.Couriers";

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("descriptors");
