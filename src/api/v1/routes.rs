/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - ゲート (AuthGate) をどの範囲に掛けるかをここで決める
 *   - /menu          : identity 付与のみ (匿名可)
 *   - /me            : 認証必須
 *   - /orders        : CUSTOMER / STAFF
 *   - /admin/roles   : ADMIN
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{menu::menu, orders::create_order, profile};
use crate::middleware::auth::{AuthGate, access, identity};
use crate::services::auth::Role;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = identity::apply(
        Router::new().route("/menu", get(menu)),
        state.auth.clone(),
    );

    let authenticated = access::apply(
        Router::new().route("/me", get(profile::me)),
        AuthGate::new(state.auth.clone()),
    );

    let ordering = access::apply(
        Router::new().route("/orders", post(create_order)),
        AuthGate::new(state.auth.clone()).with_roles([Role::Customer, Role::Staff]),
    );

    let admin = access::apply(
        Router::new().route("/admin/roles", get(profile::roles)),
        AuthGate::new(state.auth.clone()).with_roles([Role::Admin]),
    );

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(ordering)
        .merge(admin)
}
