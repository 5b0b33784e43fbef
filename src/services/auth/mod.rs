pub mod access_jwt;
pub mod factory;
pub mod identity;
pub mod key;
pub mod rbac;

pub use access_jwt::{AuthService, AuthSettings, VerifyError};
pub use factory::build_auth_service;
pub use identity::{Identity, Role, RoleAssignment, RoleRef, extract_roles};
pub use rbac::{AllowedRoles, AuthzError, authorize};
