//! Navigation hook invoked when the session can no longer be recovered.

// self
use crate::_prelude::*;

/// Receives the login route whenever the client forces re-authentication.
///
/// Embedders route this into whatever owns the user interface (a router, a window handle, a CLI
/// prompt). The call happens after credentials have been cleared.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates to `route`.
	fn navigate(&self, route: &str);
}
impl<F> Navigator for F
where
	F: Send + Sync + Fn(&str),
{
	fn navigate(&self, route: &str) {
		self(route)
	}
}

/// Navigator that ignores every request; the default for headless callers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNavigator;
impl Navigator for NoopNavigator {
	fn navigate(&self, _route: &str) {}
}

/// Navigator that records every requested route, useful for tests and for polling UIs.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator(Arc<Mutex<Vec<String>>>);
impl RecordingNavigator {
	/// Returns all routes requested so far.
	pub fn routes(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	/// Removes and returns all routes requested so far.
	pub fn drain(&self) -> Vec<String> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, route: &str) {
		self.0.lock().push(route.to_owned());
	}
}
