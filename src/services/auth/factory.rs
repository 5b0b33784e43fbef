/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthService, AuthSettings};

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let auth = AuthService::new(AuthSettings {
        public_key_base64: config.jwt_public_key_base64.clone(),
        leeway_seconds: config.jwt_leeway_seconds,
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    });

    if !auth.is_configured() {
        // Not fatal: every protected request answers 500 until the key is provided.
        tracing::error!("JWT_PUBLIC_KEY_BASE64 is not set; protected routes will fail");
    }

    Arc::new(auth)
}
