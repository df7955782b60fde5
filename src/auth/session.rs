//! Session token pair with expiry bookkeeping.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Access/refresh token pair for the current session.
///
/// The access token is short-lived and attached to outgoing requests as a
/// bearer credential; the refresh token is longer-lived and used only to mint
/// replacement access tokens. `expires_at` tracks the access token's expiry,
/// recomputed whenever the token rotates.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokens {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the session was issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant for the access token.
	pub expires_at: OffsetDateTime,
}
impl SessionTokens {
	/// Safety margin subtracted from the stored expiry so callers rotate
	/// before the server-side cutoff.
	pub const EXPIRY_BUFFER: Duration = Duration::seconds(30);

	/// Creates a session holding only an access token.
	pub fn new(access_token: impl Into<TokenSecret>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: access_token.into(), refresh_token: None, expires_at }
	}

	/// Attaches a refresh token to the session.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Replaces the access token and its expiry, keeping the refresh token.
	pub fn rotate_access_token(&mut self, token: TokenSecret, expires_at: OffsetDateTime) {
		self.access_token = token;
		self.expires_at = expires_at;
	}

	/// Returns `true` once the provided instant falls inside the buffered
	/// expiry window.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at - Self::EXPIRY_BUFFER
	}

	/// Checks the buffered expiry window against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for SessionTokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokens")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_window_applies_buffer() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let session = SessionTokens::new("access", expires);

		assert!(!session.is_expired_at(macros::datetime!(2025-01-01 00:59:29 UTC)));
		assert!(session.is_expired_at(macros::datetime!(2025-01-01 00:59:30 UTC)));
		assert!(session.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn rotation_keeps_refresh_token() {
		let mut session = SessionTokens::new("old", macros::datetime!(2025-01-01 00:00 UTC))
			.with_refresh_token("keep-me");

		session.rotate_access_token(
			TokenSecret::new("new"),
			macros::datetime!(2025-01-01 01:00 UTC),
		);

		assert_eq!(session.access_token.expose(), "new");
		assert_eq!(session.refresh_token.as_ref().map(TokenSecret::expose), Some("keep-me"));
		assert_eq!(session.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
	}

	#[test]
	fn debug_redacts_both_secrets() {
		let session = SessionTokens::new("s3cret-access", macros::datetime!(2025-01-01 00:00 UTC))
			.with_refresh_token("s3cret-refresh");
		let rendered = format!("{session:?}");

		assert!(!rendered.contains("s3cret"));
		assert!(rendered.contains("<redacted>"));
	}
}
