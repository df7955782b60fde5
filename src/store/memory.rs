//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenSecret},
	store::{StoreFuture, TokenStore},
};

type SessionSlot = Arc<RwLock<Option<SessionTokens>>>;

/// Thread-safe storage backend that keeps the session in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(SessionSlot);
impl MemoryTokenStore {
	fn set_access_token_now(slot: SessionSlot, token: TokenSecret, expires_at: OffsetDateTime) {
		let mut guard = slot.write();

		match guard.as_mut() {
			Some(session) => session.rotate_access_token(token, expires_at),
			None => *guard = Some(SessionTokens { access_token: token, refresh_token: None, expires_at }),
		}
	}
}
impl TokenStore for MemoryTokenStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|s| s.access_token.clone())) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().and_then(|s| s.refresh_token.clone())) })
	}

	fn set_access_token(
		&self,
		token: TokenSecret,
		expires_at: OffsetDateTime,
	) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			Self::set_access_token_now(slot, token, expires_at);

			Ok(())
		})
	}

	fn store_session(&self, session: SessionTokens) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(session);

			Ok(())
		})
	}

	fn clear_all(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = None;

			Ok(())
		})
	}

	fn session(&self) -> StoreFuture<'_, Option<SessionTokens>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}
}
