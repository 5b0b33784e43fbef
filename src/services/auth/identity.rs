//! Verified identity and the role claim shape.
//!
//! The issuer sends roles as a doubly wrapped list:
//! `"role": [{ "role": { "role": "STAFF" } }]`. That nesting is kept as-is in
//! [`RoleAssignment`] / [`RoleRef`] so a shape change upstream shows up as
//! dropped roles instead of being flattened away.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Closed set of roles known to the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    FranchiseOwner,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::FranchiseOwner, Role::Staff, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::FranchiseOwner => "FRANCHISE_OWNER",
            Role::Staff => "STAFF",
            Role::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Outer wrapper of one role claim entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoleAssignment {
    pub role: Option<RoleRef>,
}

/// Inner wrapper carrying the raw role name as sent by the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoleRef {
    pub role: Option<String>,
}

/// `role` member of a wrapper object: absent and `null` both read as unset.
fn role_member(object: &Map<String, Value>) -> Option<&Value> {
    object.get("role").filter(|v| !v.is_null())
}

impl RoleAssignment {
    /// Reads one entry of the `role` claim array.
    ///
    /// Both wrapper levels must be JSON objects and the name a string. Anything
    /// else (arrays, numbers, a bare string) is not an entry and gives `None`.
    /// Serde's derived struct impls would also take positional arrays, so the
    /// shape is matched by hand.
    pub fn from_claim_entry(entry: &Value) -> Option<Self> {
        let Value::Object(outer) = entry else {
            return None;
        };

        let role = match role_member(outer) {
            None => None,
            Some(Value::Object(inner)) => {
                let name = match role_member(inner) {
                    None => None,
                    Some(Value::String(name)) => Some(name.clone()),
                    Some(_) => return None,
                };
                Some(RoleRef { role: name })
            }
            Some(_) => return None,
        };

        Some(Self { role })
    }

    /// The held role, if the entry is complete and names a known role.
    pub fn held_role(&self) -> Option<Role> {
        self.role
            .as_ref()
            .and_then(|r| r.role.as_deref())
            .and_then(|name| name.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("missing or empty 'sub' claim")]
    MissingSubject,
    #[error("'{0}' claim has the wrong type")]
    WrongType(&'static str),
}

/// Claim set of a token whose signature and time window were verified.
///
/// Only built by `AuthService::verify`, so holding one means the token was valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    subject: String,
    email: Option<String>,
    role_assignments: Vec<RoleAssignment>,
    claims: Map<String, Value>,
}

impl Identity {
    /// Boundary parse from a raw (already verified) claim set.
    ///
    /// `sub` must be a non-empty string and `email`, if present, a string.
    /// The role claim never fails the parse: a non-array value counts as no
    /// roles, and entries that don't fit the wrapper shape are dropped.
    pub(crate) fn from_claims(claims: Map<String, Value>) -> Result<Self, ClaimsError> {
        let subject = match claims.get("sub") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(ClaimsError::MissingSubject);
            }
            Some(_) => return Err(ClaimsError::WrongType("sub")),
        };

        let email = match claims.get("email") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ClaimsError::WrongType("email")),
        };

        let role_assignments = match claims.get("role") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    let assignment = RoleAssignment::from_claim_entry(entry);
                    if assignment.is_none() {
                        tracing::debug!(entry = %entry, "dropping malformed role entry");
                    }
                    assignment
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            subject,
            email,
            role_assignments,
            claims,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role_assignments(&self) -> &[RoleAssignment] {
        &self.role_assignments
    }

    /// Known roles held by this identity, in claim order, without duplicates.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = Vec::new();
        for role in self.role_assignments.iter().filter_map(RoleAssignment::held_role) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role_assignments
            .iter()
            .any(|a| a.held_role() == Some(role))
    }

    /// Full verified claim set, exactly as received.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Roles of a possibly absent identity (no identity means no roles).
pub fn extract_roles(identity: Option<&Identity>) -> Vec<Role> {
    identity.map(Identity::roles).unwrap_or_default()
}
