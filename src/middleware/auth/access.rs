//! Request gate: bearer extraction → RS256 verification → role check.
//!
//! On success the verified [`Identity`] is inserted into request extensions
//! (read it with `CurrentUser`). On failure the request never reaches the
//! handler and the caller gets one of the `AuthError` responses.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AuthError;
use crate::middleware::auth::bearer::{self, BearerError};
use crate::services::auth::{AllowedRoles, AuthService, Identity, VerifyError, rbac};

/// Allow (with the identity) or deny (with the reason).
pub type AuthorizationOutcome = Result<Identity, AuthError>;

/// A verifier plus the roles a group of routes requires.
///
/// `AuthGate::new` alone only requires a valid token.
#[derive(Clone, Debug)]
pub struct AuthGate {
    auth: Arc<AuthService>,
    allowed: AllowedRoles,
}

impl AuthGate {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            allowed: AllowedRoles::any(),
        }
    }

    pub fn with_roles(mut self, roles: impl Into<AllowedRoles>) -> Self {
        self.allowed = roles.into();
        self
    }

    pub fn allowed_roles(&self) -> &AllowedRoles {
        &self.allowed
    }

    /// Run the whole decision for one request's headers.
    pub fn check(&self, headers: &HeaderMap) -> AuthorizationOutcome {
        let token = bearer::bearer_from_headers(headers).map_err(|err| {
            match err {
                BearerError::Missing => tracing::debug!("no authorization header"),
                BearerError::Malformed | BearerError::Empty => {
                    tracing::warn!(error = %err, "unusable authorization header")
                }
            }
            AuthError::from(err)
        })?;

        let identity = self.auth.verify(token).map_err(|err| {
            match &err {
                VerifyError::Configuration(e) => {
                    tracing::error!(error = %e, "access token verifier is misconfigured")
                }
                _ => tracing::warn!(error = ?err, "access token verification failed"),
            }
            AuthError::from(err)
        })?;

        rbac::authorize(&identity, &self.allowed).map_err(|err| {
            tracing::warn!(
                sub = %identity.subject(),
                required = ?err.required,
                held = ?err.held,
                "insufficient permissions"
            );
            AuthError::from(err)
        })?;

        Ok(identity)
    }
}

/// Put the gate in front of every route of `router`.
///
/// 例：
/// ```ignore
/// let admin = Router::new().route("/reports", get(reports));
/// let admin = middleware::auth::access::apply(admin, AuthGate::new(auth).with_roles([Role::Admin]));
/// app = app.nest("/admin", admin);
/// ```
pub fn apply<S>(router: Router<S>, gate: AuthGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<AuthGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = gate.check(req.headers())?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
