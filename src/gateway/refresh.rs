//! Refresh-and-retry recovery shared by every 401-failing request.
//!
//! A 401 on a non-login, non-refresh target funnels into
//! [`Gateway::recover_unauthorized`]. The first such request becomes the
//! episode leader and installs the refresh future; concurrent failures join
//! the same episode and wait on its broadcast outcome. Exactly one refresh
//! call is issued per episode, every queued request replays with the token it
//! produced, and a terminal failure tears the session down once before
//! fanning out to all of them.

// crates.io
use http::request::Parts;
// self
use crate::{
	_prelude::*,
	api::RefreshApi,
	error::RefreshError,
	gateway::{
		Gateway, RefreshMetrics, derive_with_bearer,
		singleflight::{EpisodeRole, RefreshOutcome},
	},
	http::{GatewayResponse, GatewayTransport},
	obs::{self, StageKind, StageOutcome, StageSpan},
	session::SessionHandler,
};

impl<T> Gateway<T>
where
	T: ?Sized + GatewayTransport,
{
	/// Recovers a 401-failing request by joining (or starting) the refresh
	/// episode and replaying the request with the token it produces.
	pub(crate) async fn recover_unauthorized(
		&self,
		parts: &Parts,
		body: &[u8],
	) -> Result<GatewayResponse> {
		const KIND: StageKind = StageKind::Refresh;

		let span = StageSpan::new(KIND, "recover_unauthorized");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let episode = self.coordinator.join_or_start(|| self.refresh_episode());

				if episode.role == EpisodeRole::Waiter {
					self.refresh_metrics.record_join();
				}

				let outcome = episode.outcome.clone().await;

				self.coordinator.finish(&episode);

				match outcome {
					// The replay carries the episode's brand-new token, never
					// the one that drew the 401.
					Ok(token) => self.execute(derive_with_bearer(parts, body, &token)?).await,
					Err(err) => Err(err.into()),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	/// Builds the episode future executed once per expiry burst.
	///
	/// The future owns clones of the gateway's shared state so it stays
	/// `'static` inside the coordinator; it keeps resolving even if the
	/// request that installed it is dropped, as long as any queued request
	/// still polls the episode.
	fn refresh_episode(&self) -> BoxFuture<'static, RefreshOutcome> {
		let store = self.store.clone();
		let session = self.session.clone();
		let metrics = self.refresh_metrics.clone();
		let api = RefreshApi::new(self.transport.clone(), self.endpoints.refresh_url().clone());

		async move {
			metrics.record_attempt();

			let refresh_token = match store.refresh_token().await {
				Ok(Some(token)) => token,
				Ok(None) =>
					return fail_closed(&*session, &metrics, RefreshError::MissingRefreshToken)
						.await,
				Err(err) =>
					return fail_closed(
						&*session,
						&metrics,
						RefreshError::Store { message: err.to_string() },
					)
					.await,
			};
			let grant = match api.exchange(&refresh_token).await {
				Ok(grant) => grant,
				Err(err) => return fail_closed(&*session, &metrics, err).await,
			};

			if let Err(err) =
				store.set_access_token(grant.access_token.clone(), grant.expires_at).await
			{
				return fail_closed(
					&*session,
					&metrics,
					RefreshError::Store { message: err.to_string() },
				)
				.await;
			}

			metrics.record_success();

			Ok(grant.access_token)
		}
		.boxed()
	}
}

/// Tears the session down and converts `err` into the episode outcome.
async fn fail_closed(
	session: &dyn SessionHandler,
	metrics: &RefreshMetrics,
	err: RefreshError,
) -> RefreshOutcome {
	metrics.record_failure();
	session.logout().await;
	session.navigate_to_login().await;

	Err(err)
}
