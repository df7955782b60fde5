//! Gateway-level error types shared across dispatch, refresh, and storage.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// HTTP responses carrying error statuses other than the handled 401 case are
/// not represented here; they pass back to the caller as plain responses. Only
/// storage faults, terminal refresh outcomes, request construction problems,
/// and transport-level failures surface as [`Error`] values.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Terminal refresh outcome; the session has been torn down.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns `true` when the error ended the session (refresh failure or a
	/// missing refresh token), meaning credentials were cleared and the caller
	/// should surface a sign-in prompt.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::Refresh(_))
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Stored token cannot be rendered as an `Authorization` header value.
	#[error("Bearer header value could not be constructed from the stored token.")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}

/// Terminal refresh outcomes fanned out to every request queued on the
/// in-flight refresh.
///
/// Each variant is fatal for the current session: the gateway invokes logout
/// and navigation before surfacing it, and no queued request retries. The type
/// is `Clone` because a single refresh outcome is broadcast to all waiters.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// No refresh token was present when a 401 demanded a refresh.
	#[error("No refresh token is available for the current session.")]
	MissingRefreshToken,
	/// The refresh request itself could not be constructed.
	#[error("Refresh request could not be constructed: {message}.")]
	RequestBuild {
		/// Human-readable construction failure.
		message: String,
	},
	/// Network failure while calling the refresh endpoint.
	#[error("Network error occurred while calling the refresh endpoint: {message}.")]
	Transport {
		/// Human-readable transport failure.
		message: String,
	},
	/// The refresh endpoint answered with an error status or envelope.
	#[error("Refresh endpoint rejected the session: {message}.")]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Endpoint- or gateway-supplied reason string.
		message: String,
	},
	/// The refresh endpoint returned a body the gateway could not parse.
	#[error("Refresh endpoint returned a malformed response: {message}.")]
	ResponseParse {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Path-annotated parsing failure.
		message: String,
	},
	/// Token storage failed while completing the refresh.
	#[error("Token store failed during refresh: {message}.")]
	Store {
		/// Human-readable storage failure.
		message: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while executing the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
