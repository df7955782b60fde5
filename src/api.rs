//! Refresh endpoint client: request construction and envelope parsing.
//!
//! The refresh call presents the refresh token as a bearer credential and
//! expects a JSON envelope of the shape
//! `{"status": "success", "data": {"accessToken": ..., "expiresIn": ...}}`.
//! Every failure maps into a [`RefreshError`], which the refresh episode
//! broadcasts to all queued requests.

// crates.io
use http::{HeaderValue, Method, StatusCode, header};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::RefreshError,
	http::{GatewayRequest, GatewayTransport},
};

const SUCCESS_STATUS: &str = "success";

/// Freshly minted access token together with its recomputed expiry.
#[derive(Clone, Debug)]
pub(crate) struct AccessGrant {
	pub access_token: TokenSecret,
	pub expires_at: OffsetDateTime,
}

/// Client for the refresh endpoint, bound to a transport and a target URL.
pub(crate) struct RefreshApi<T>
where
	T: ?Sized + GatewayTransport,
{
	transport: Arc<T>,
	refresh_url: Url,
}
impl<T> RefreshApi<T>
where
	T: ?Sized + GatewayTransport,
{
	pub fn new(transport: Arc<T>, refresh_url: Url) -> Self {
		Self { transport, refresh_url }
	}

	/// Exchanges the refresh token for a new access grant.
	pub async fn exchange(&self, refresh_token: &TokenSecret) -> Result<AccessGrant, RefreshError> {
		let request = self.build_request(refresh_token)?;
		let response = self
			.transport
			.execute(request)
			.await
			.map_err(|e| RefreshError::Transport { message: e.to_string() })?;

		parse_grant(response.status(), response.body(), OffsetDateTime::now_utc())
	}

	fn build_request(&self, refresh_token: &TokenSecret) -> Result<GatewayRequest, RefreshError> {
		let mut bearer = HeaderValue::try_from(format!("Bearer {}", refresh_token.expose()))
			.map_err(|e| RefreshError::RequestBuild { message: e.to_string() })?;

		bearer.set_sensitive(true);

		http::Request::builder()
			.method(Method::POST)
			.uri(self.refresh_url.as_str())
			.header(header::AUTHORIZATION, bearer)
			.header(header::CONTENT_TYPE, "application/json")
			.body(b"{}".to_vec())
			.map_err(|e| RefreshError::RequestBuild { message: e.to_string() })
	}
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
	status: String,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	data: Option<RefreshPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
	access_token: String,
	expires_in: i64,
}

/// Interprets a refresh endpoint response body against its HTTP status.
fn parse_grant(
	status: StatusCode,
	body: &[u8],
	now: OffsetDateTime,
) -> Result<AccessGrant, RefreshError> {
	let code = Some(status.as_u16());

	if !status.is_success() {
		let message = serde_json::from_slice::<ApiEnvelope>(body)
			.ok()
			.and_then(|envelope| envelope.message)
			.unwrap_or_else(|| format!("refresh endpoint returned HTTP {}", status.as_u16()));

		return Err(RefreshError::Rejected { status: code, message });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let envelope: ApiEnvelope = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| RefreshError::ResponseParse { status: code, message: e.to_string() })?;

	if envelope.status != SUCCESS_STATUS {
		return Err(RefreshError::Rejected {
			status: code,
			message: envelope
				.message
				.unwrap_or_else(|| format!("refresh endpoint reported status `{}`", envelope.status)),
		});
	}

	let payload = envelope.data.ok_or_else(|| RefreshError::Rejected {
		status: code,
		message: "refresh endpoint response is missing its data payload".into(),
	})?;

	if payload.access_token.is_empty() {
		return Err(RefreshError::ResponseParse {
			status: code,
			message: "the accessToken value must not be empty".into(),
		});
	}
	if payload.expires_in <= 0 {
		return Err(RefreshError::ResponseParse {
			status: code,
			message: "the expiresIn value must be positive".into(),
		});
	}

	Ok(AccessGrant {
		access_token: TokenSecret::new(payload.access_token),
		expires_at: now + Duration::seconds(payload.expires_in),
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

	#[test]
	fn success_envelope_yields_grant_with_recomputed_expiry() {
		let body = br#"{"status":"success","message":"","data":{"accessToken":"access-new","expiresIn":3600,"tokenType":"Bearer"}}"#;
		let grant = parse_grant(StatusCode::OK, body, NOW)
			.expect("Success envelope should parse into a grant.");

		assert_eq!(grant.access_token.expose(), "access-new");
		assert_eq!(grant.expires_at, NOW + Duration::hours(1));
	}

	#[test]
	fn error_status_surfaces_the_envelope_message() {
		let body = br#"{"status":"error","message":"refresh token revoked"}"#;
		let err = parse_grant(StatusCode::UNAUTHORIZED, body, NOW)
			.expect_err("Error statuses should be rejected.");

		assert_eq!(
			err,
			RefreshError::Rejected { status: Some(401), message: "refresh token revoked".into() },
		);
	}

	#[test]
	fn error_status_with_opaque_body_falls_back_to_the_code() {
		let err = parse_grant(StatusCode::BAD_GATEWAY, b"<html>boom</html>", NOW)
			.expect_err("Error statuses should be rejected.");

		assert!(matches!(
			err,
			RefreshError::Rejected { status: Some(502), ref message }
				if message.contains("502"),
		));
	}

	#[test]
	fn non_success_envelope_status_is_rejected() {
		let body = br#"{"status":"failed","data":{"accessToken":"a","expiresIn":10}}"#;
		let err = parse_grant(StatusCode::OK, body, NOW)
			.expect_err("Envelope statuses other than success should be rejected.");

		assert!(matches!(
			err,
			RefreshError::Rejected { ref message, .. } if message.contains("failed"),
		));
	}

	#[test]
	fn missing_data_payload_is_rejected() {
		let body = br#"{"status":"success","message":"ok"}"#;
		let err = parse_grant(StatusCode::OK, body, NOW)
			.expect_err("Envelopes without data should be rejected.");

		assert!(matches!(
			err,
			RefreshError::Rejected { ref message, .. } if message.contains("data payload"),
		));
	}

	#[test]
	fn malformed_json_reports_the_failing_path() {
		let body = br#"{"status":"success","data":{"accessToken":42,"expiresIn":10}}"#;
		let err = parse_grant(StatusCode::OK, body, NOW)
			.expect_err("Malformed payloads should fail to parse.");

		assert!(matches!(
			err,
			RefreshError::ResponseParse { ref message, .. } if message.contains("accessToken"),
		));
	}

	#[test]
	fn non_positive_expiry_is_refused() {
		let body = br#"{"status":"success","data":{"accessToken":"a","expiresIn":0}}"#;
		let err = parse_grant(StatusCode::OK, body, NOW)
			.expect_err("Non-positive expiry values should be refused.");

		assert!(matches!(
			err,
			RefreshError::ResponseParse { ref message, .. } if message.contains("positive"),
		));
	}
}
