//! Single-flight coordination for refresh episodes.

// self
use crate::{_prelude::*, auth::TokenSecret, error::RefreshError};

/// Outcome broadcast to every request queued on a refresh episode.
pub(crate) type RefreshOutcome = Result<TokenSecret, RefreshError>;
/// Broadcast handle: a one-shot future shared by the leader and all waiters.
pub(crate) type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Role a request was assigned when it reached the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EpisodeRole {
	/// This request installed the episode and drives the refresh call.
	Leader,
	/// A refresh was already in flight; this request waits for its outcome.
	Waiter,
}

/// Handle onto an in-flight refresh episode.
pub(crate) struct EpisodeHandle {
	pub role: EpisodeRole,
	pub outcome: SharedRefresh,
	epoch: u64,
}

#[derive(Default)]
struct CoordinatorState {
	epoch: u64,
	current: Option<SharedRefresh>,
}

/// Owner of the process-wide refresh state: the in-progress flag plus the
/// broadcast channel carrying the episode outcome.
///
/// At most one refresh is in flight at any time. A request that observes an
/// in-flight episode captures its `Shared` handle at observation time, so a
/// waiter can never receive an earlier or later episode's outcome. The flag
/// returns to idle when the episode resolves, success or failure; nothing
/// here is persisted.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
	state: Mutex<CoordinatorState>,
}
impl RefreshCoordinator {
	/// Returns `true` while a refresh episode is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().current.is_some()
	}

	/// Joins the in-flight episode, or installs the future produced by
	/// `refresh` as a new one.
	///
	/// The factory runs only when this call elects a leader. The episode
	/// future is polled through every handle, so the refresh keeps moving as
	/// long as at least one queued request is still waiting on it.
	pub fn join_or_start<F>(&self, refresh: F) -> EpisodeHandle
	where
		F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
	{
		let mut state = self.state.lock();

		if let Some(current) = state.current.clone() {
			return EpisodeHandle { role: EpisodeRole::Waiter, outcome: current, epoch: state.epoch };
		}

		state.epoch += 1;

		let outcome = refresh().shared();

		state.current = Some(outcome.clone());

		EpisodeHandle { role: EpisodeRole::Leader, outcome, epoch: state.epoch }
	}

	/// Marks the handle's episode complete, returning the flag to idle.
	///
	/// Idempotent across a single episode's handles; a late call made after a
	/// newer episode started is a no-op.
	pub fn finish(&self, handle: &EpisodeHandle) {
		let mut state = self.state.lock();

		if state.epoch == handle.epoch {
			state.current = None;
		}
	}
}
impl Debug for CoordinatorState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CoordinatorState")
			.field("epoch", &self.epoch)
			.field("in_flight", &self.current.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn resolved(outcome: RefreshOutcome) -> BoxFuture<'static, RefreshOutcome> {
		async move { outcome }.boxed()
	}

	#[tokio::test]
	async fn leader_then_waiters_share_one_episode() {
		let coordinator = RefreshCoordinator::default();
		let leader =
			coordinator.join_or_start(|| resolved(Ok(TokenSecret::new("fresh-token"))));
		let waiter = coordinator.join_or_start(|| panic!("A second refresh must never start."));

		assert_eq!(leader.role, EpisodeRole::Leader);
		assert_eq!(waiter.role, EpisodeRole::Waiter);
		assert!(coordinator.is_refreshing());

		let first = leader.outcome.clone().await;
		let second = waiter.outcome.clone().await;

		assert_eq!(first, Ok(TokenSecret::new("fresh-token")));
		assert_eq!(first, second);

		coordinator.finish(&leader);

		assert!(!coordinator.is_refreshing());
	}

	#[tokio::test]
	async fn failures_fan_out_to_every_handle() {
		let coordinator = RefreshCoordinator::default();
		let leader = coordinator.join_or_start(|| resolved(Err(RefreshError::MissingRefreshToken)));
		let waiter = coordinator.join_or_start(|| panic!("A second refresh must never start."));

		assert_eq!(leader.outcome.clone().await, Err(RefreshError::MissingRefreshToken));
		assert_eq!(waiter.outcome.clone().await, Err(RefreshError::MissingRefreshToken));
	}

	#[tokio::test]
	async fn late_finish_from_a_previous_episode_is_ignored() {
		let coordinator = RefreshCoordinator::default();
		let stale = coordinator.join_or_start(|| resolved(Ok(TokenSecret::new("first"))));

		let _ = stale.outcome.clone().await;

		coordinator.finish(&stale);

		let _active = coordinator.join_or_start(|| resolved(Ok(TokenSecret::new("second"))));

		coordinator.finish(&stale);

		assert!(coordinator.is_refreshing());
	}
}
