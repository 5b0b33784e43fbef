//! Non-rejecting identity layer.
//!
//! Verifies the bearer token when one is sent and attaches `Option<Identity>`
//! to the request. Never denies: routes that accept anonymous callers read it
//! with `MaybeUser` and decide for themselves.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::middleware::auth::bearer;
use crate::services::auth::{AuthService, Identity};

pub fn apply<S>(router: Router<S>, auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, identity_middleware))
}

/// Best-effort identity for a request: `None` on any failure.
pub fn derive_identity(auth: &AuthService, headers: &axum::http::HeaderMap) -> Option<Identity> {
    let token = bearer::bearer_from_headers(headers).ok()?;

    match auth.verify(token) {
        Ok(identity) => Some(identity),
        Err(err) => {
            if err.is_configuration() {
                tracing::error!(error = %err, "access token verifier is misconfigured");
            } else {
                tracing::debug!(error = %err, "ignoring unverifiable bearer token");
            }
            None
        }
    }
}

async fn identity_middleware(
    State(auth): State<Arc<AuthService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity = derive_identity(&auth, req.headers());
    req.extensions_mut().insert(MaybeIdentity(identity));

    next.run(req).await
}

/// Extension slot written by this layer.
#[derive(Debug, Clone)]
pub(crate) struct MaybeIdentity(pub(crate) Option<Identity>);
