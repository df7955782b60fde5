//! Demonstrates wiring a custom transport into the gateway.
//!
//! 1. Implement [`GatewayTransport`] over canned responses.
//! 2. Pass the transport to [`Gateway::with_transport`].
//! 3. Observe that transport faults surface as [`Error::Transport`] while
//!    non-401 error statuses pass through as plain responses.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use bearer_gateway::{
	endpoints::Endpoints,
	error::{Error, TransportError},
	gateway::Gateway,
	http::{
		GatewayRequest, GatewayResponse, GatewayTransport, Request, StatusCode, TransportFuture,
	},
	session::{SessionFuture, SessionHandler},
	store::{MemoryTokenStore, TokenStore},
};

#[derive(Clone)]
enum MockBehavior {
	Healthy,
	Maintenance,
	NetworkDown,
}

struct MockBackend {
	behavior: MockBehavior,
}
impl MockBackend {
	fn new(behavior: MockBehavior) -> Self {
		Self { behavior }
	}
}
impl GatewayTransport for MockBackend {
	fn execute(&self, _request: GatewayRequest) -> TransportFuture<'_> {
		let behavior = self.behavior.clone();

		Box::pin(async move {
			match behavior {
				MockBehavior::Healthy => Ok(canned(StatusCode::OK, b"{\"ready\":true}")),
				MockBehavior::Maintenance =>
					Ok(canned(StatusCode::SERVICE_UNAVAILABLE, b"{\"ready\":false}")),
				MockBehavior::NetworkDown =>
					Err(TransportError::Io(std::io::Error::other("connection reset by peer"))),
			}
		})
	}
}

fn canned(status: StatusCode, body: &[u8]) -> GatewayResponse {
	let mut response = GatewayResponse::new(body.to_vec());

	*response.status_mut() = status;

	response
}

struct NoopSession;
impl SessionHandler for NoopSession {
	fn logout(&self) -> SessionFuture<'_> {
		Box::pin(async {})
	}

	fn navigate_to_login(&self) -> SessionFuture<'_> {
		Box::pin(async {})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	for behavior in [MockBehavior::Healthy, MockBehavior::Maintenance, MockBehavior::NetworkDown] {
		let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::default());
		let endpoints =
			Endpoints::new(Url::parse("https://upstream.example.com/api/v1/auth/refresh")?);
		let gateway: Gateway<MockBackend> = Gateway::with_transport(
			store,
			endpoints,
			Arc::new(NoopSession),
			MockBackend::new(behavior),
		);
		let request = Request::builder()
			.method("GET")
			.uri("https://upstream.example.com/api/v1/status")
			.body(Vec::new())?;

		match gateway.dispatch(request).await {
			Ok(response) => println!(
				"Upstream answered HTTP {} with body {}.",
				response.status(),
				String::from_utf8_lossy(response.body()),
			),
			Err(Error::Transport(e)) => println!("Transport fault surfaced untouched: {e}"),
			Err(e) => println!("Unexpected gateway error: {e}"),
		}
	}

	Ok(())
}
