//! Single-flight refresh coordination.
//!
//! [`RefreshCoordinator`] owns the `refreshing` flag and the FIFO queue of requests parked behind
//! the refresh in flight. The first request that observes an expired access token becomes the
//! leader and receives a [`RefreshLead`]; every later one receives a [`RefreshWaiter`] until the
//! leader is dropped. Resolving a lead delivers the outcome to the queue without releasing the
//! flag, so session cleanup can finish before another refresh may start. Dropping the lead is
//! the cleanup step: it resets the flag and drains late waiters under one lock acquisition, so
//! the queue is never non-empty while no refresh is running. A lead dropped before it resolved
//! (a cancelled future or a panic) releases its waiters with [`RefreshError::Abandoned`].

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::collections::VecDeque;
// crates.io
use futures::channel::oneshot;
// self
use crate::{_prelude::*, auth::TokenSecret, error::RefreshError};

type RefreshOutcome = Result<TokenSecret, RefreshError>;

/// Shared refresh state for one client and all of its clones.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	state: Mutex<RefreshState>,
}
impl RefreshCoordinator {
	/// Returns true while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Returns the number of requests parked behind the refresh in flight.
	pub fn pending(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Either claims the refresh or enqueues behind the one already running.
	///
	/// The flag flips before this returns, so no await point separates the check from the claim.
	pub(crate) fn join(self: &Arc<Self>) -> RefreshTicket {
		let mut state = self.state.lock();

		if state.refreshing {
			let (sender, receiver) = oneshot::channel();

			state.waiters.push_back(sender);

			RefreshTicket::Wait(RefreshWaiter(receiver))
		} else {
			state.refreshing = true;

			RefreshTicket::Lead(RefreshLead { coordinator: Arc::clone(self), outcome: None })
		}
	}

	fn notify(&self, outcome: &RefreshOutcome) -> usize {
		let waiters = std::mem::take(&mut self.state.lock().waiters);
		let released = waiters.len();

		Self::deliver(waiters, outcome);

		released
	}

	fn finish(&self, outcome: &RefreshOutcome) {
		let waiters = {
			let mut state = self.state.lock();

			state.refreshing = false;

			std::mem::take(&mut state.waiters)
		};

		Self::deliver(waiters, outcome);
	}

	fn deliver(waiters: VecDeque<oneshot::Sender<RefreshOutcome>>, outcome: &RefreshOutcome) {
		for waiter in waiters {
			// A waiter whose request future was dropped no longer listens.
			let _ = waiter.send(outcome.clone());
		}
	}
}

#[derive(Debug, Default)]
struct RefreshState {
	refreshing: bool,
	waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Result of [`RefreshCoordinator::join`].
#[derive(Debug)]
pub(crate) enum RefreshTicket {
	/// The caller owns the refresh and must settle it.
	Lead(RefreshLead),
	/// The caller waits for the current leader.
	Wait(RefreshWaiter),
}

/// Ownership of the refresh in flight.
#[derive(Debug)]
pub(crate) struct RefreshLead {
	coordinator: Arc<RefreshCoordinator>,
	outcome: Option<RefreshOutcome>,
}
impl RefreshLead {
	/// Delivers `outcome` to every waiter in FIFO order and returns how many were released; the
	/// flag stays set until drop.
	pub(crate) fn resolve(&mut self, outcome: RefreshOutcome) -> usize {
		let released = self.coordinator.notify(&outcome);

		self.outcome = Some(outcome);

		released
	}
}
impl Drop for RefreshLead {
	fn drop(&mut self) {
		let outcome = self.outcome.take().unwrap_or(Err(RefreshError::Abandoned));

		self.coordinator.finish(&outcome);
	}
}

/// Pending request parked behind a refresh.
#[derive(Debug)]
pub(crate) struct RefreshWaiter(oneshot::Receiver<RefreshOutcome>);
impl RefreshWaiter {
	/// Resolves with the refreshed access token or the refresh failure.
	pub(crate) async fn wait(self) -> RefreshOutcome {
		match self.0.await {
			Ok(outcome) => outcome,
			Err(oneshot::Canceled) => Err(RefreshError::Abandoned),
		}
	}
}
