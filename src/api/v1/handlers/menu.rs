/*
 * Responsibility
 * - GET /menu (匿名でも可、ログイン済みなら名前付きで返す)
 */
use axum::Json;

use crate::api::v1::dto::profile::MenuResponse;
use crate::extractors::MaybeUser;

const MENU: [&str; 3] = ["margherita", "caesar salad", "tiramisu"];

pub async fn menu(MaybeUser(user): MaybeUser) -> Json<MenuResponse> {
    let greeting = match user.as_ref().and_then(|u| u.email()) {
        Some(email) => format!("welcome back, {email}"),
        None => "welcome".to_string(),
    };

    Json(MenuResponse {
        greeting,
        items: MENU.to_vec(),
    })
}
