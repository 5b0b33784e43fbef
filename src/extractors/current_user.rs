use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::middleware::auth::identity::MaybeIdentity;
use crate::services::auth::Identity;

/// Handler で、検証済み Identity を受け取るための extractor
/// AuthGate が Identity を request.extensions() に insert 済みである前提
/// 見つからない場合は NoToken (401 + JSON body) を返す（ゲート未設定）
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::NoToken)
    }
}

/// Identity-or-none for routes that also serve anonymous callers.
///
/// Filled by the identity layer, or by the gate when one ran.
pub struct MaybeUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(MaybeUser(Some(identity.clone())));
        }

        let derived = parts
            .extensions
            .get::<MaybeIdentity>()
            .and_then(|m| m.0.clone());

        Ok(MaybeUser(derived))
    }
}
