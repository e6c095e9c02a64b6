//! Request construction: payload, metadata and deadline.
use std::{str::FromStr, time::Duration};
use tonic::metadata::{
    AsciiMetadataValue, MetadataKey, MetadataValue,
    errors::{InvalidMetadataKey, InvalidMetadataValue},
};

/// Metadata key carrying the caller identifier.
pub const CALLER_HEADER: &str = "service-client";

/// Largest deadline the `grpc-timeout` header can carry (8 digits of hours).
pub const MAX_GRPC_TIMEOUT: Duration = Duration::from_secs(99_999_999 * 60 * 60);

#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
}

impl From<RequestError> for tonic::Status {
    fn from(err: RequestError) -> Self {
        tonic::Status::invalid_argument(err.to_string())
    }
}

/// Parses a caller identifier into a metadata value.
pub(crate) fn caller_value(caller: &str) -> Result<AsciiMetadataValue, InvalidMetadataValue> {
    MetadataValue::from_str(caller)
}

pub(crate) fn build_request<T>(
    payload: T,
    caller: Option<&AsciiMetadataValue>,
    headers: Vec<(String, String)>,
    timeout: Duration,
) -> Result<tonic::Request<T>, RequestError> {
    let mut request = tonic::Request::new(payload);
    // Longer deadlines are still enforced locally, unclamped.
    request.set_timeout(timeout.min(MAX_GRPC_TIMEOUT));

    for (k, v) in headers {
        let key = MetadataKey::from_str(&k).map_err(|source| RequestError::InvalidMetadataKey {
            key: k.clone(),
            source,
        })?;
        let val = MetadataValue::from_str(&v)
            .map_err(|source| RequestError::InvalidMetadataValue { key: k, source })?;
        request.metadata_mut().insert(key, val);
    }

    // Inserted last so per-call headers cannot spoof the caller.
    if let Some(caller) = caller {
        request.metadata_mut().insert(CALLER_HEADER, caller.clone());
    }

    Ok(request)
}
