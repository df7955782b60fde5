//! Endpoint identification rules consumed by the dispatch pipeline.

// crates.io
use http::Uri;
// self
use crate::_prelude::*;

/// Endpoint configuration for a gateway instance.
///
/// Targets are classified by literal substring match against the rendered
/// request URI: requests whose target contains the login fragment bypass the
/// gateway entirely (no session exists yet), and a 401 on a target containing
/// the refresh fragment is never allowed to trigger another refresh. The
/// refresh URL is where the gateway itself sends rotation calls.
#[derive(Clone, Debug)]
pub struct Endpoints {
	refresh_url: Url,
	login_fragment: String,
	refresh_fragment: String,
}
impl Endpoints {
	/// Default login path fragment.
	pub const LOGIN_FRAGMENT: &'static str = "/auth/login";
	/// Default refresh path fragment.
	pub const REFRESH_FRAGMENT: &'static str = "/auth/refresh";

	/// Creates an endpoint set around the provided refresh URL with the
	/// default path fragments.
	pub fn new(refresh_url: Url) -> Self {
		Self {
			refresh_url,
			login_fragment: Self::LOGIN_FRAGMENT.into(),
			refresh_fragment: Self::REFRESH_FRAGMENT.into(),
		}
	}

	/// Overrides the login path fragment.
	pub fn with_login_fragment(mut self, fragment: impl Into<String>) -> Self {
		self.login_fragment = fragment.into();

		self
	}

	/// Overrides the refresh path fragment.
	pub fn with_refresh_fragment(mut self, fragment: impl Into<String>) -> Self {
		self.refresh_fragment = fragment.into();

		self
	}

	/// Returns the refresh endpoint URL.
	pub fn refresh_url(&self) -> &Url {
		&self.refresh_url
	}

	/// Checks whether the target identifies the login endpoint.
	pub fn is_login(&self, target: &Uri) -> bool {
		Self::matches(target, &self.login_fragment)
	}

	/// Checks whether the target identifies the refresh endpoint.
	pub fn is_refresh(&self, target: &Uri) -> bool {
		Self::matches(target, &self.refresh_fragment)
	}

	fn matches(target: &Uri, fragment: &str) -> bool {
		target.to_string().contains(fragment)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn endpoints() -> Endpoints {
		Endpoints::new(
			Url::parse("http://localhost:8080/api/v1/auth/refresh")
				.expect("Refresh URL fixture should parse."),
		)
	}

	fn uri(value: &str) -> Uri {
		value.parse().expect("URI fixture should parse.")
	}

	#[test]
	fn fragments_match_by_substring() {
		let endpoints = endpoints();

		assert!(endpoints.is_login(&uri("http://localhost:8080/api/v1/auth/login")));
		assert!(endpoints.is_refresh(&uri("http://localhost:8080/api/v1/auth/refresh")));
		assert!(!endpoints.is_login(&uri("http://localhost:8080/api/v1/employees")));
		assert!(!endpoints.is_refresh(&uri("http://localhost:8080/api/v1/employees")));
	}

	#[test]
	fn fragments_are_overridable() {
		let endpoints = endpoints()
			.with_login_fragment("/session/open")
			.with_refresh_fragment("/session/renew");

		assert!(endpoints.is_login(&uri("https://api.example.com/session/open")));
		assert!(endpoints.is_refresh(&uri("https://api.example.com/session/renew")));
		assert!(!endpoints.is_login(&uri("https://api.example.com/auth/login")));
	}
}
