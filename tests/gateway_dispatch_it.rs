#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bearer_gateway::_preludet::*;

#[tokio::test]
async fn attaches_bearer_header_when_token_is_present() {
	let server = MockServer::start_async().await;
	let (gateway, store, _) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);

	seed_session(&store, "access-123", "refresh-123").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/employees")
				.header("authorization", "Bearer access-123");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/employees")))
		.await
		.expect("Dispatch should succeed for a valid token.");

	mock.assert_async().await;

	assert_eq!(response.status().as_u16(), 200);
	assert_eq!(response.body().as_slice(), b"{\"ok\":true}");
}

#[tokio::test]
async fn dispatches_unmodified_when_no_token_is_stored() {
	let server = MockServer::start_async().await;
	let (gateway, _, _) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/statistics");
			then.status(200).body("{}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/statistics")))
		.await
		.expect("Dispatch should succeed without a stored token.");

	mock.assert_async().await;

	assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn login_requests_never_carry_authorization() {
	let server = MockServer::start_async().await;
	let (gateway, store, _) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);

	seed_session(&store, "access-123", "refresh-123").await;

	// Only matches if the gateway (incorrectly) decorated the login call.
	let decorated = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/auth/login")
				.header("authorization", "Bearer access-123");
			then.status(200).body("{}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/auth/login")))
		.await
		.expect("Login dispatch should pass through the transport.");

	decorated.assert_calls_async(0).await;

	// Nothing matched the undecorated request, so the mock server answers 404.
	assert_ne!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn unauthorized_login_responses_never_trigger_refresh() {
	let server = MockServer::start_async().await;
	let (gateway, store, handler) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);

	seed_session(&store, "access-123", "refresh-123").await;

	let login = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/auth/login");
			then.status(401).body("{\"status\":\"error\",\"message\":\"bad credentials\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).body("{\"status\":\"success\",\"data\":{\"accessToken\":\"unused\",\"expiresIn\":3600}}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/auth/login")))
		.await
		.expect("A 401 on the login endpoint should pass through unchanged.");

	login.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(response.status().as_u16(), 401);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
	assert_eq!(handler.logouts(), 0);
}

#[tokio::test]
async fn unauthorized_refresh_targets_pass_through() {
	let server = MockServer::start_async().await;
	let (gateway, store, _) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);

	seed_session(&store, "access-123", "refresh-123").await;

	let refresh_target = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/auth/refresh")
				.header("authorization", "Bearer access-123");
			then.status(401).body("{\"status\":\"error\",\"message\":\"nope\"}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/auth/refresh")))
		.await
		.expect("A 401 on the refresh endpoint should pass through unchanged.");

	refresh_target.assert_async().await;

	assert_eq!(response.status().as_u16(), 401);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn unrelated_error_statuses_pass_through() {
	let server = MockServer::start_async().await;
	let (gateway, store, handler) =
		build_reqwest_test_gateway(
			Url::parse(&server.url("/api/v1/auth/refresh"))
				.expect("Refresh URL fixture should parse."),
		);

	seed_session(&store, "access-123", "refresh-123").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/inventory");
			then.status(503).body("{\"status\":\"error\",\"message\":\"maintenance\"}");
		})
		.await;
	let response = gateway
		.dispatch(get_request(&server.url("/api/v1/inventory")))
		.await
		.expect("A 503 must not be interpreted by the gateway.");

	mock.assert_async().await;

	assert_eq!(response.status().as_u16(), 503);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
	assert_eq!(handler.logouts(), 0);
}
