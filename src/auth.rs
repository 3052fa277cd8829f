//! Session credential models: redacted token secrets and the login/refresh payloads.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
