//! Optional observability helpers for client flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `medrecords_client.flow` with the `flow` and
//!   `stage` (call site) fields, plus events for refresh and forced-logout transitions.
//! - Enable `metrics` to increment the `medrecords_client_flow_total` counter for every flow
//!   outcome, labeled by `flow` + `outcome`. Settled refreshes also record the
//!   `medrecords_client_refresh_released_waiters` histogram (requests released from the queue),
//!   and forced logouts increment `medrecords_client_session_end_total`, labeled by `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authenticated backend request, including its replay.
	Request,
	/// Access-token refresh.
	Refresh,
	/// Credential login.
	Login,
	/// Session teardown, explicit or forced.
	Logout,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Request => "request",
			FlowKind::Refresh => "refresh",
			FlowKind::Login => "login",
			FlowKind::Logout => "logout",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Request parked behind an in-flight refresh.
	Queued,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::Queued => "queued",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reason the client ended a session on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionEnd {
	/// The refresh endpoint itself answered `401`.
	RefreshEndpointRejected,
	/// An access token expired while no refresh token was stored.
	MissingRefreshToken,
	/// The refresh call failed or returned an unusable token.
	RefreshFailed,
}
impl SessionEnd {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionEnd::RefreshEndpointRejected => "refresh_endpoint_rejected",
			SessionEnd::MissingRefreshToken => "missing_refresh_token",
			SessionEnd::RefreshFailed => "refresh_failed",
		}
	}
}
impl Display for SessionEnd {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
