//! Authenticated request gateway: decoration, dispatch, and recovery entry points.

mod metrics;
mod refresh;
mod singleflight;

pub use metrics::RefreshMetrics;

// crates.io
use http::{HeaderValue, StatusCode, header, request::Parts};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	endpoints::Endpoints,
	error::ConfigError,
	gateway::singleflight::RefreshCoordinator,
	http::{GatewayRequest, GatewayResponse, GatewayTransport},
	obs::{self, StageKind, StageOutcome, StageSpan},
	session::SessionHandler,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Pipeline stage that authenticates outgoing requests and recovers from
/// access-token expiry.
///
/// The gateway owns the transport, token store, endpoint rules, and session
/// teardown hooks so the dispatch path can focus on protocol decisions:
/// decorate, execute, and - on an authentication failure - run exactly one
/// refresh per expiry burst before replaying the queued requests. All shared
/// refresh state lives in an explicitly owned coordinator, so independent
/// gateway instances never observe each other's episodes.
pub struct Gateway<T>
where
	T: ?Sized + GatewayTransport,
{
	/// Transport executing every outbound request.
	pub transport: Arc<T>,
	/// Token store holding the session credentials.
	pub store: Arc<dyn TokenStore>,
	/// Teardown hooks invoked on unrecoverable auth failures.
	pub session: Arc<dyn SessionHandler>,
	/// Endpoint identification rules.
	pub endpoints: Endpoints,
	/// Shared metrics recorder for refresh episodes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	coordinator: Arc<RefreshCoordinator>,
}
impl<T> Gateway<T>
where
	T: ?Sized + GatewayTransport,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn TokenStore>,
		endpoints: Endpoints,
		session: Arc<dyn SessionHandler>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			session,
			endpoints,
			refresh_metrics: Default::default(),
			coordinator: Default::default(),
		}
	}

	/// Returns `true` while a token refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_refreshing()
	}

	/// Dispatches a request through the authenticated pipeline.
	///
	/// Non-login requests are decorated with the stored access token when one
	/// is available and no refresh is in flight. A 401 on a non-refresh
	/// target enters the refresh-and-retry protocol; every other response,
	/// error statuses included, returns to the caller unchanged. Transport
	/// failures are never interpreted here and surface as
	/// [`Error::Transport`](crate::error::Error::Transport).
	pub async fn dispatch(&self, request: GatewayRequest) -> Result<GatewayResponse> {
		const KIND: StageKind = StageKind::Dispatch;

		let span = StageSpan::new(KIND, "dispatch");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span.instrument(self.dispatch_pipeline(request)).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn dispatch_pipeline(&self, request: GatewayRequest) -> Result<GatewayResponse> {
		let (parts, body) = request.into_parts();

		// The login endpoint has no session yet: no decoration, no recovery.
		if self.endpoints.is_login(&parts.uri) {
			return self.execute(rebuild_request(&parts, &body)).await;
		}

		let access_token = self.store.access_token().await?;
		let request = match access_token {
			// A request issued while a refresh is in flight goes out
			// undecorated; if it draws a 401 it queues on that same episode.
			Some(token) if !self.coordinator.is_refreshing() =>
				derive_with_bearer(&parts, &body, &token)?,
			_ => rebuild_request(&parts, &body),
		};
		let response = self.execute(request).await?;

		// A 401 from the refresh endpoint itself must not recurse.
		if response.status() != StatusCode::UNAUTHORIZED || self.endpoints.is_refresh(&parts.uri) {
			return Ok(response);
		}

		self.recover_unauthorized(&parts, &body).await
	}

	pub(crate) async fn execute(&self, request: GatewayRequest) -> Result<GatewayResponse> {
		Ok(self.transport.execute(request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway backed by the crate's default reqwest transport.
	///
	/// Use [`Gateway::with_transport`] to supply a custom transport, or wrap a
	/// preconfigured [`ReqwestClient`] via
	/// [`ReqwestTransport::with_client`].
	pub fn new(
		store: Arc<dyn TokenStore>,
		endpoints: Endpoints,
		session: Arc<dyn SessionHandler>,
	) -> Self {
		Self::with_transport(store, endpoints, session, ReqwestTransport::default())
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + GatewayTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			session: self.session.clone(),
			endpoints: self.endpoints.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + GatewayTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("endpoints", &self.endpoints)
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}

/// Rebuilds a request from its captured parts; retries derive from the same
/// parts so the dispatched original stays immutable.
pub(crate) fn rebuild_request(parts: &Parts, body: &[u8]) -> GatewayRequest {
	GatewayRequest::from_parts(parts.clone(), body.to_vec())
}

/// Derives a copy of the request carrying `Authorization: Bearer <token>`.
pub(crate) fn derive_with_bearer(
	parts: &Parts,
	body: &[u8],
	token: &TokenSecret,
) -> Result<GatewayRequest> {
	let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose()))
		.map_err(ConfigError::from)?;

	value.set_sensitive(true);

	let mut request = rebuild_request(parts, body);

	request.headers_mut().insert(header::AUTHORIZATION, value);

	Ok(request)
}
