//! Demonstrates the full refresh-and-retry flow against a local mock API.
//!
//! 1. Seed a [`MemoryTokenStore`] with an already-expired access token.
//! 2. Dispatch a protected request; the upstream answers 401.
//! 3. The gateway performs one refresh call, rotates the stored token, and
//!    replays the request, so the caller only observes the final 200.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::OffsetDateTime;
use url::Url;
// self
use bearer_gateway::{
	auth::SessionTokens,
	endpoints::Endpoints,
	gateway::ReqwestGateway,
	http::Request,
	session::{SessionFuture, SessionHandler},
	store::{MemoryTokenStore, TokenStore},
};

struct ConsoleSession;
impl SessionHandler for ConsoleSession {
	fn logout(&self) -> SessionFuture<'_> {
		Box::pin(async {
			println!("Session torn down; credentials cleared.");
		})
	}

	fn navigate_to_login(&self) -> SessionFuture<'_> {
		Box::pin(async {
			println!("Returning to the sign-in surface.");
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/protected")
				.header("authorization", "Bearer expired-access");
			then.status(401).body("{\"status\":\"error\",\"message\":\"unauthorized\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/protected")
				.header("authorization", "Bearer new-access");
			then.status(200).body("{\"items\":[\"laptop\",\"badge\"]}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/auth/refresh")
				.header("authorization", "Bearer refresh-123");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"status\":\"success\",\"message\":\"\",\"data\":{\"accessToken\":\"new-access\",\"expiresIn\":3600,\"tokenType\":\"Bearer\"}}",
				);
		})
		.await;

	let store = Arc::new(MemoryTokenStore::default());

	store
		.store_session(
			SessionTokens::new("expired-access", OffsetDateTime::now_utc())
				.with_refresh_token("refresh-123"),
		)
		.await?;

	let endpoints = Endpoints::new(Url::parse(&server.url("/api/v1/auth/refresh"))?);
	let gateway = ReqwestGateway::new(store.clone(), endpoints, Arc::new(ConsoleSession));
	let request =
		Request::builder().method("GET").uri(server.url("/api/v1/protected")).body(Vec::new())?;
	let response = gateway.dispatch(request).await?;

	println!(
		"Caller observed HTTP {} with body {}.",
		response.status(),
		String::from_utf8_lossy(response.body()),
	);
	println!(
		"Refresh episodes: {} started, {} joined, {} succeeded.",
		gateway.refresh_metrics.attempts(),
		gateway.refresh_metrics.singleflight_joins(),
		gateway.refresh_metrics.successes(),
	);

	if let Some(session) = store.session().await? {
		println!("Store now holds a token expiring at {}.", session.expires_at);
	}

	Ok(())
}
