//! Role check for protected routes.
//!
//! - No IO
//! - No panics
//! - Empty requirement means "any verified identity"
use std::collections::BTreeSet;

use thiserror::Error;

use crate::services::auth::identity::{Identity, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient permissions: required one of {required:?}, held {held:?}")]
pub struct AuthzError {
    pub required: Vec<Role>,
    pub held: Vec<Role>,
}

/// Roles a route accepts. Holding any one of them is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedRoles(BTreeSet<Role>);

impl AllowedRoles {
    /// No role check at all.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for AllowedRoles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for AllowedRoles {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl From<Vec<Role>> for AllowedRoles {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().collect()
    }
}

/// Allow iff `allowed` is empty or intersects the identity's known roles.
pub fn authorize(identity: &Identity, allowed: &AllowedRoles) -> Result<(), AuthzError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let held = identity.roles();
    if held.iter().any(|role| allowed.contains(*role)) {
        Ok(())
    } else {
        Err(AuthzError {
            required: allowed.iter().collect(),
            held,
        })
    }
}
