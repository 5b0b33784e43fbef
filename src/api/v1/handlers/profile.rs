/*
 * Responsibility
 * - GET /me (認証必須、ロール不問)
 * - GET /admin/roles (ADMIN のみ)
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::dto::profile::ProfileResponse;
use crate::extractors::CurrentUser;
use crate::services::auth::Role;

pub async fn me(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&user))
}

pub async fn roles(CurrentUser(user): CurrentUser) -> Json<Value> {
    tracing::info!(sub = %user.subject(), "admin listed roles");
    Json(json!({ "roles": Role::ALL }))
}
