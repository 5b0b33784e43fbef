use serde::Serialize;

use crate::services::auth::{Identity, Role};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub sub: String,
    pub email: Option<String>,
    pub roles: Vec<Role>,
}

impl From<&Identity> for ProfileResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            sub: identity.subject().to_string(),
            email: identity.email().map(str::to_string),
            roles: identity.roles(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub greeting: String,
    pub items: Vec<&'static str>,
}
