//! Single-flight bearer-token gateway - decorate outgoing requests, coalesce
//! concurrent 401s into one refresh, and replay callers with the rotated token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod session;
pub mod store;

mod api;

#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	// std
	use std::sync::atomic::{AtomicU64, Ordering};

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::SessionTokens,
		endpoints::Endpoints,
		gateway::{Gateway, ReqwestGateway},
		http::GatewayRequest,
		session::{SessionFuture, SessionHandler},
		store::{MemoryTokenStore, TokenStore},
	};

	/// Session handler that counts teardown callbacks and clears the backing
	/// store on logout, honoring the [`SessionHandler`] contract.
	#[derive(Debug)]
	pub struct RecordingSessionHandler {
		store: Arc<MemoryTokenStore>,
		logouts: AtomicU64,
		navigations: AtomicU64,
	}
	impl RecordingSessionHandler {
		/// Creates a handler that clears `store` whenever logout fires.
		pub fn new(store: Arc<MemoryTokenStore>) -> Self {
			Self { store, logouts: AtomicU64::new(0), navigations: AtomicU64::new(0) }
		}

		/// Returns the number of logout invocations observed.
		pub fn logouts(&self) -> u64 {
			self.logouts.load(Ordering::Relaxed)
		}

		/// Returns the number of navigation invocations observed.
		pub fn navigations(&self) -> u64 {
			self.navigations.load(Ordering::Relaxed)
		}
	}
	impl SessionHandler for RecordingSessionHandler {
		fn logout(&self) -> SessionFuture<'_> {
			Box::pin(async move {
				self.logouts.fetch_add(1, Ordering::Relaxed);

				let _ = self.store.clear_all().await;
			})
		}

		fn navigate_to_login(&self) -> SessionFuture<'_> {
			Box::pin(async move {
				self.navigations.fetch_add(1, Ordering::Relaxed);
			})
		}
	}

	/// Builds a gateway wired to an in-memory store and a recording session handler.
	pub fn build_reqwest_test_gateway(
		refresh_url: Url,
	) -> (ReqwestGateway, Arc<MemoryTokenStore>, Arc<RecordingSessionHandler>) {
		let store_backend = Arc::new(MemoryTokenStore::default());
		let handler = Arc::new(RecordingSessionHandler::new(store_backend.clone()));
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let session: Arc<dyn SessionHandler> = handler.clone();
		let gateway = Gateway::new(store, Endpoints::new(refresh_url), session);

		(gateway, store_backend, handler)
	}

	/// Seeds the store with a session holding both fixture tokens, already
	/// inside the expiry window.
	pub async fn seed_session(store: &MemoryTokenStore, access: &str, refresh: &str) {
		let session =
			SessionTokens::new(access, OffsetDateTime::now_utc() - Duration::minutes(5))
				.with_refresh_token(refresh);

		store.store_session(session).await.expect("Failed to seed session into the store.");
	}

	/// Builds a bodyless GET request for the provided target.
	pub fn get_request(target: &str) -> GatewayRequest {
		http::Request::builder()
			.method("GET")
			.uri(target)
			.body(Vec::new())
			.expect("Request fixture should build.")
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use futures::{
		FutureExt,
		future::{BoxFuture, Shared},
	};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {bearer_gateway as _, color_eyre as _, httpmock as _};
