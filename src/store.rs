//! Storage contracts and built-in backends for session tokens.

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the current session's tokens.
///
/// The gateway is the sole writer outside of login: it rotates the access
/// token after a successful refresh and reads both secrets on the hot path.
/// Implementations hold at most one session at a time.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the current access token, if one is stored.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the current refresh token, if one is stored.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Replaces the access token and its expiry.
	///
	/// When no session exists yet, a session holding only the access token is
	/// created so a later read does not observe a half-written state.
	fn set_access_token(
		&self,
		token: TokenSecret,
		expires_at: OffsetDateTime,
	) -> StoreFuture<'_, ()>;

	/// Persists a full session, replacing whatever was stored before.
	fn store_session(&self, session: SessionTokens) -> StoreFuture<'_, ()>;

	/// Removes every stored credential.
	fn clear_all(&self) -> StoreFuture<'_, ()>;

	/// Returns a copy of the stored session, if any.
	fn session(&self) -> StoreFuture<'_, Option<SessionTokens>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
