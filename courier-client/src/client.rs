//! # Courier Client
//!
//! [`CourierClient`] wraps the generated `Couriers` stub. It owns the connection to
//! the courier service and forwards one typed request per call.
//!
//! Every call:
//!
//! 1. Fails fast if the client was closed.
//! 2. Attaches the `service-client` header when a caller identifier is configured,
//!    plus any extra headers from [`CallOptions`].
//! 3. Bounds the call by the call timeout (or the per-call override), both through
//!    the `grpc-timeout` header and locally.
//! 4. Returns the response, or logs and returns the [`tonic::Status`] unchanged.
//!
//! Dropping the future returned by a call cancels it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use courier_client::{ClientConfig, ClientOptions, CourierClient};
//! use courier_client::pb::GetCourierRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?
//!     .with_options(ClientOptions::default().with_caller("courier-dashboard"));
//!
//! let client = CourierClient::connect(&config).await?;
//! let resp = client
//!     .get_courier(GetCourierRequest { id: "42".to_string() })
//!     .await?;
//! println!("{:?}", resp.courier);
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```
mod options;
mod request;

pub use options::*;
pub use request::{CALLER_HEADER, RequestError};

use crate::{BoxError, config::ClientConfig, tls::TlsError};
use courier_api::{
    CouriersClient,
    pb::{
        AddCourierRequest, AddCourierResponse, DeleteCourierRequest, DeleteResponse,
        GetCourierRequest, GetCourierResponse, SearchCouriersRequest, SearchCouriersResponse,
        UpdateCourierRequest, UpdateCourierResponse,
    },
};
use http_body::Body as HttpBody;
use request::{build_request, caller_value};
use std::{
    future::Future,
    sync::{PoisonError, RwLock},
    time::Duration,
};
use tonic::{
    Status,
    metadata::{AsciiMetadataValue, errors::InvalidMetadataValue},
    transport::{Channel, Endpoint},
};
use tracing::{debug, error};

/// Errors that can occur while setting up or closing a [`CourierClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid uri for address '{addr}': '{source}'")]
    InvalidUri {
        addr: String,
        source: http::uri::InvalidUri,
    },
    #[error("Failed to set up client TLS: '{0}'")]
    Tls(#[from] TlsError),
    #[error("Invalid TLS configuration for '{addr}': '{source}'")]
    InvalidTlsConfig {
        addr: String,
        source: tonic::transport::Error,
    },
    #[error("Failed to connect to '{addr}': '{source}'")]
    ConnectionFailed {
        addr: String,
        source: tonic::transport::Error,
    },
    #[error("Timed out after {timeout:?} connecting to '{addr}'")]
    DialTimeout { addr: String, timeout: Duration },
    #[error("Invalid caller identifier '{caller}': '{source}'")]
    InvalidCaller {
        caller: String,
        source: InvalidMetadataValue,
    },
    #[error("The courier client is already closed")]
    AlreadyClosed,
}

/// Client of the courier service.
///
/// All calls take `&self`, so a single client can be shared between tasks. Calls are
/// multiplexed over the same connection.
pub struct CourierClient<S = Channel> {
    stub: RwLock<Option<CouriersClient<S>>>,
    options: ClientOptions,
    caller: Option<AsciiMetadataValue>,
}

impl CourierClient<Channel> {
    /// Sets up TLS and dials the courier service, waiting for the connection
    /// to be established. The whole dial, TLS handshake included, is bounded by
    /// the dial timeout.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.address.to_string();

        let result = async {
            let endpoint = endpoint(config)?;
            let timeout = config.options.dial_timeout;

            let channel = match tokio::time::timeout(timeout, endpoint.connect()).await {
                Ok(channel) => channel.map_err(|source| ClientError::ConnectionFailed {
                    addr: addr.clone(),
                    source,
                })?,
                Err(_) => {
                    return Err(ClientError::DialTimeout {
                        addr: addr.clone(),
                        timeout,
                    });
                }
            };

            Self::from_service(channel, config.options.clone())
        }
        .await;

        match &result {
            Ok(_) => debug!(address = %addr, "courier client connected"),
            Err(err) => error!(address = %addr, error = %err, "courier client failed to connect"),
        }

        result
    }

    /// Like [`CourierClient::connect`] but the connection is only established on the
    /// first call. Must be called from within a Tokio runtime.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, ClientError> {
        let result = endpoint(config)
            .and_then(|e| Self::from_service(e.connect_lazy(), config.options.clone()));

        if let Err(err) = &result {
            error!(address = %config.address, error = %err, "error setting up courier client");
        }

        result
    }
}

fn endpoint(config: &ClientConfig) -> Result<Endpoint, ClientError> {
    let addr = config.address.to_string();
    let uri = config
        .address
        .uri()
        .map_err(|source| ClientError::InvalidUri {
            addr: addr.clone(),
            source,
        })?;

    let tls = config.tls.load()?;
    let opts = &config.options;

    Endpoint::from(uri)
        .connect_timeout(opts.dial_timeout)
        .http2_keep_alive_interval(opts.keep_alive_interval)
        .keep_alive_timeout(opts.keep_alive_timeout)
        .keep_alive_while_idle(true)
        .tls_config(tls)
        .map_err(|source| ClientError::InvalidTlsConfig { addr, source })
}

impl<S> CourierClient<S>
where
    S: tonic::client::GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a client from an existing Tonic service/channel.
    pub fn from_service(service: S, options: ClientOptions) -> Result<Self, ClientError> {
        let caller = options
            .caller()
            .map(|caller| {
                caller_value(caller).map_err(|source| ClientError::InvalidCaller {
                    caller: caller.to_string(),
                    source,
                })
            })
            .transpose()
            .inspect_err(|err| error!(error = %err, "error setting up courier client"))?;

        Ok(Self {
            stub: RwLock::new(Some(CouriersClient::new(service))),
            options,
            caller,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        self.stub
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Releases the connection. Calls issued afterwards fail with `Cancelled`.
    ///
    /// Calls already in flight are not interrupted. Closing twice returns
    /// [`ClientError::AlreadyClosed`].
    pub fn close(&self) -> Result<(), ClientError> {
        let stub = self
            .stub
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match stub {
            Some(_) => {
                debug!("courier client connection closed");
                Ok(())
            }
            None => {
                let err = ClientError::AlreadyClosed;
                error!(error = %err, "error closing courier client connection");
                Err(err)
            }
        }
    }

    pub async fn register_courier(
        &self,
        request: AddCourierRequest,
    ) -> Result<AddCourierResponse, Status> {
        self.register_courier_with(request, CallOptions::default()).await
    }

    pub async fn register_courier_with(
        &self,
        request: AddCourierRequest,
        call: CallOptions,
    ) -> Result<AddCourierResponse, Status> {
        self.invoke("RegisterCourier", request, call, |mut stub, req| async move {
            stub.register_courier(req).await
        })
        .await
    }

    pub async fn update_courier(
        &self,
        request: UpdateCourierRequest,
    ) -> Result<UpdateCourierResponse, Status> {
        self.update_courier_with(request, CallOptions::default()).await
    }

    pub async fn update_courier_with(
        &self,
        request: UpdateCourierRequest,
        call: CallOptions,
    ) -> Result<UpdateCourierResponse, Status> {
        self.invoke("UpdateCourier", request, call, |mut stub, req| async move {
            stub.update_courier(req).await
        })
        .await
    }

    pub async fn get_courier(
        &self,
        request: GetCourierRequest,
    ) -> Result<GetCourierResponse, Status> {
        self.get_courier_with(request, CallOptions::default()).await
    }

    pub async fn get_courier_with(
        &self,
        request: GetCourierRequest,
        call: CallOptions,
    ) -> Result<GetCourierResponse, Status> {
        self.invoke("GetCourier", request, call, |mut stub, req| async move {
            stub.get_courier(req).await
        })
        .await
    }

    pub async fn search_couriers(
        &self,
        request: SearchCouriersRequest,
    ) -> Result<SearchCouriersResponse, Status> {
        self.search_couriers_with(request, CallOptions::default()).await
    }

    pub async fn search_couriers_with(
        &self,
        request: SearchCouriersRequest,
        call: CallOptions,
    ) -> Result<SearchCouriersResponse, Status> {
        self.invoke("SearchCouriers", request, call, |mut stub, req| async move {
            stub.search_couriers(req).await
        })
        .await
    }

    pub async fn delete_courier(
        &self,
        request: DeleteCourierRequest,
    ) -> Result<DeleteResponse, Status> {
        self.delete_courier_with(request, CallOptions::default()).await
    }

    pub async fn delete_courier_with(
        &self,
        request: DeleteCourierRequest,
        call: CallOptions,
    ) -> Result<DeleteResponse, Status> {
        self.invoke("DeleteCourier", request, call, |mut stub, req| async move {
            stub.delete_courier(req).await
        })
        .await
    }

    async fn invoke<Req, Resp, F, Fut>(
        &self,
        operation: &'static str,
        payload: Req,
        call: CallOptions,
        rpc: F,
    ) -> Result<Resp, Status>
    where
        F: FnOnce(CouriersClient<S>, tonic::Request<Req>) -> Fut,
        Fut: Future<Output = Result<tonic::Response<Resp>, Status>>,
    {
        let result = self.dispatch(payload, call, rpc).await;

        match &result {
            Ok(_) => debug!(operation, "courier call succeeded"),
            Err(status) => error!(
                operation,
                caller = self.options.caller().unwrap_or_default(),
                code = ?status.code(),
                error = %status.message(),
                "courier call failed"
            ),
        }

        result
    }

    async fn dispatch<Req, Resp, F, Fut>(
        &self,
        payload: Req,
        call: CallOptions,
        rpc: F,
    ) -> Result<Resp, Status>
    where
        F: FnOnce(CouriersClient<S>, tonic::Request<Req>) -> Fut,
        Fut: Future<Output = Result<tonic::Response<Resp>, Status>>,
    {
        // The lock is released before awaiting; the clone shares the channel.
        let stub = self
            .stub
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Status::cancelled("courier client is closed"))?;

        let timeout = call.timeout.unwrap_or(self.options.call_timeout);
        let request = build_request(payload, self.caller.as_ref(), call.headers, timeout)?;

        match tokio::time::timeout(timeout, rpc(stub, request)).await {
            Ok(response) => response.map(tonic::Response::into_inner),
            Err(_) => Err(Status::deadline_exceeded(format!(
                "courier call did not complete within {timeout:?}"
            ))),
        }
    }
}
