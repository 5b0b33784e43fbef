pub mod access;
pub mod bearer;
pub mod identity;

pub use access::{AuthGate, AuthorizationOutcome};
