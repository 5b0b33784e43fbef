//! Shared request gate and queue helpers for the Good Food services.
//!
//! - `middleware::auth`: bearer extraction, RS256 verification, role check
//! - `extractors`: `CurrentUser` / `MaybeUser` for handlers
//! - `services::queue`: JSON publish/subscribe over Valkey
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod services;
pub mod state;

pub use error::AuthError;
pub use extractors::{CurrentUser, MaybeUser};
pub use middleware::auth::{AuthGate, AuthorizationOutcome};
pub use services::auth::{
    AllowedRoles, AuthService, AuthSettings, Identity, Role, RoleAssignment, RoleRef,
    extract_roles,
};
pub use services::queue::{MemoryQueue, QueueBus, QueueClient, QueueError, ValkeyQueue};
