//! Session teardown contract invoked on unrecoverable auth failures.

// self
use crate::_prelude::*;

/// Boxed future returned by [`SessionHandler`] callbacks.
pub type SessionFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Teardown hooks the gateway invokes when a session cannot be recovered.
///
/// Both callbacks fire at most once per refresh episode, in order: `logout`
/// first, then `navigate_to_login`. Implementations own the consequences --
/// `logout` is expected to clear the token store so no stale credential leaks
/// into a later session, and `navigate_to_login` routes the user (or the
/// embedding application) back to its sign-in surface.
pub trait SessionHandler
where
	Self: Send + Sync,
{
	/// Tears the session down, clearing every stored credential.
	fn logout(&self) -> SessionFuture<'_>;

	/// Routes the caller back to the sign-in surface.
	fn navigate_to_login(&self) -> SessionFuture<'_>;
}
