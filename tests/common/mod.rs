#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use good_food_utils::{AuthService, AuthSettings};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ISSUER_PRIVATE_PEM: &str = include_str!("../fixtures/issuer_private.pem");
pub const ISSUER_PUBLIC_PEM: &str = include_str!("../fixtures/issuer_public.pem");
pub const OTHER_PRIVATE_PEM: &str = include_str!("../fixtures/other_private.pem");
pub const ISSUER_PUBLIC_PKCS1_PEM: &str = include_str!("../fixtures/issuer_public_pkcs1.pem");
pub const BROKEN_RSA_PUBLIC_PEM: &str = include_str!("../fixtures/broken_rsa_public.pem");

pub fn public_key_base64() -> String {
    STANDARD.encode(ISSUER_PUBLIC_PEM)
}

pub fn settings_with_pem(pem: &str) -> AuthSettings {
    AuthSettings {
        public_key_base64: Some(STANDARD.encode(pem)),
        ..Default::default()
    }
}

pub fn settings() -> AuthSettings {
    AuthSettings {
        public_key_base64: Some(public_key_base64()),
        ..Default::default()
    }
}

pub fn auth_service() -> Arc<AuthService> {
    Arc::new(AuthService::new(settings()))
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims the way the identity issuer shapes them.
pub fn claims_with_roles(roles: &[&str]) -> Value {
    let entries: Vec<Value> = roles
        .iter()
        .map(|r| json!({ "role": { "role": r } }))
        .collect();

    json!({
        "sub": "7c1f7a4e-user",
        "email": "staff@good-food.test",
        "iat": now(),
        "exp": now() + 600,
        "role": entries,
    })
}

pub fn sign_with(private_pem: &str, claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("fixture key");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key).expect("sign token")
}

pub fn sign(claims: &Value) -> String {
    sign_with(ISSUER_PRIVATE_PEM, claims)
}

/// GET `uri` with an optional raw `authorization` value; returns status + JSON body.
pub async fn get(router: Router, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(value) = authorization {
        req = req.header(header::AUTHORIZATION, value);
    }

    let res = router
        .oneshot(req.body(Body::empty()).expect("request"))
        .await
        .expect("infallible router");

    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, body)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
