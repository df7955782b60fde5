//! Transport primitives the gateway sits on top of.
//!
//! The module exposes [`GatewayTransport`], the gateway's only dependency on
//! an HTTP stack. Requests and responses travel as plain [`http`] types with
//! byte bodies so custom transports can integrate without pulling in a
//! specific client crate. The default [`ReqwestTransport`] adapter is enabled
//! through the `reqwest` feature.

pub use http::{HeaderValue, Method, Request, Response, StatusCode, Uri, header};

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Outbound request flowing through the gateway.
pub type GatewayRequest = http::Request<Vec<u8>>;
/// Response handed back to the gateway by a transport.
pub type GatewayResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`GatewayTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing gateway requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can
/// be shared across gateway clones without additional wrappers, and the
/// returned futures must be `Send` so dispatches can hop executors. Errors
/// reported here are transport-level only (DNS, TCP, TLS, IO); responses with
/// error statuses are still successful executions and must be returned as
/// [`GatewayResponse`] values.
pub trait GatewayTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request against the upstream service.
	fn execute(&self, request: GatewayRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The gateway replays requests verbatim after a refresh, so the wrapped
/// client should not follow redirects that would strip the `Authorization`
/// header across origins. Configure any custom [`ReqwestClient`] accordingly
/// before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayTransport for ReqwestTransport {
	fn execute(&self, request: GatewayRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = request.try_into().map_err(TransportError::from)?;
			let response = client.execute(request).await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();
			let mut rebuilt = GatewayResponse::new(body);

			*rebuilt.status_mut() = status;
			*rebuilt.headers_mut() = headers;

			Ok(rebuilt)
		})
	}
}
