//! Credential models: redacted token secrets and the session token pair.

pub mod secret;
pub mod session;

pub use secret::*;
pub use session::*;
