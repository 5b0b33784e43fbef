mod common;

use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, routing::get};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use common::{bearer, claims_with_roles, get as call, now, sign, sign_with};
use good_food_utils::middleware::auth::access;
use good_food_utils::{AuthError, AuthGate, AuthService, AuthSettings, CurrentUser, Role};

async fn whoami(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "sub": user.subject(), "roles": user.roles() }))
}

fn protected(gate: AuthGate) -> Router {
    access::apply(Router::new().route("/protected", get(whoami)), gate)
}

fn gate() -> AuthGate {
    AuthGate::new(common::auth_service())
}

fn denied(message: &str) -> Value {
    json!({ "message": message })
}

#[tokio::test]
async fn current_user_without_gate_is_no_token() {
    let ungated = Router::new().route("/protected", get(whoami));

    let (status, body) = call(ungated, "/protected", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - No Token"));
}

#[tokio::test]
async fn missing_or_non_bearer_header_is_no_token() {
    for header in [None, Some("Basic dXNlcjpwYXNz"), Some("bearer abc"), Some("Token abc")] {
        let (status, body) = call(protected(gate()), "/protected", header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        assert_eq!(body, denied("Unauthorized - No Token"));
    }
}

#[tokio::test]
async fn empty_token_after_prefix() {
    let (status, body) = call(protected(gate()), "/protected", Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Empty Token"));
}

#[tokio::test]
async fn token_from_another_key_is_invalid() {
    let token = sign_with(common::OTHER_PRIVATE_PEM, &claims_with_roles(&["ADMIN"]));

    let (status, body) = call(protected(gate()), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Invalid Token"));
}

#[tokio::test]
async fn expired_token_is_just_invalid() {
    let mut claims = claims_with_roles(&["ADMIN"]);
    claims["exp"] = json!(now() - 3600);

    let (status, body) = call(
        protected(gate()),
        "/protected",
        Some(bearer(&sign(&claims)).as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Invalid Token"));
}

#[tokio::test]
async fn not_yet_valid_token_is_invalid() {
    let mut claims = claims_with_roles(&[]);
    claims["nbf"] = json!(now() + 3600);

    let (status, body) = call(
        protected(gate()),
        "/protected",
        Some(bearer(&sign(&claims)).as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Invalid Token"));
}

#[tokio::test]
async fn garbage_and_symmetric_tokens_are_invalid() {
    let (status, _) = call(protected(gate()), "/protected", Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // HS256 signed with the public key text must not pass an RS256 verifier.
    let hs = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims_with_roles(&["ADMIN"]),
        &EncodingKey::from_secret(common::ISSUER_PUBLIC_PEM.as_bytes()),
    )
    .unwrap();
    let (status, body) = call(protected(gate()), "/protected", Some(bearer(&hs).as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Invalid Token"));
}

#[tokio::test]
async fn token_without_subject_is_invalid() {
    let token = sign(&json!({ "exp": now() + 600 }));

    let (status, body) = call(protected(gate()), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - Invalid Token"));
}

#[tokio::test]
async fn no_required_roles_allows_without_role_claim() {
    let token = sign(&json!({ "sub": "u-1", "exp": now() + 600 }));

    let (status, body) = call(protected(gate()), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sub": "u-1", "roles": [] }));
}

#[tokio::test]
async fn staff_vs_admin_requirement() {
    let token = sign(&claims_with_roles(&["STAFF"]));
    let auth = Some(bearer(&token));

    let admin_only = gate().with_roles([Role::Admin]);
    let (status, body) = call(protected(admin_only), "/protected", auth.as_deref()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, denied("Forbidden - Insufficient permissions"));

    let staff_or_admin = gate().with_roles([Role::Staff, Role::Admin]);
    let (status, body) = call(protected(staff_or_admin), "/protected", auth.as_deref()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["STAFF"]));
}

#[tokio::test]
async fn malformed_role_entries_do_not_count() {
    let mut claims = claims_with_roles(&[]);
    claims["role"] = json!([
        { "role": null },
        { "role": { "role": "CUSTOMER" } },
        { "role": {} },
        { "role": { "role": "ROOT" } },
        [["ADMIN"]],
        [[["ADMIN"]]],
        { "role": ["ADMIN"] },
        { "role": [["ADMIN"]] },
    ]);
    let auth = Some(bearer(&sign(&claims)));

    let (status, body) = call(
        protected(gate().with_roles([Role::Customer])),
        "/protected",
        auth.as_deref(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["CUSTOMER"]));

    let (status, _) = call(
        protected(gate().with_roles([Role::Admin, Role::FranchiseOwner])),
        "/protected",
        auth.as_deref(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_key_configuration_is_a_service_fault() {
    let unconfigured = AuthGate::new(Arc::new(AuthService::new(AuthSettings::default())));

    let (status, body) = call(protected(unconfigured), "/protected", Some("Bearer whatever")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, denied("Internal Server Error - Missing configuration"));
}

#[tokio::test]
async fn undecodable_key_configuration_is_a_service_fault() {
    let broken = AuthGate::new(Arc::new(AuthService::new(AuthSettings {
        public_key_base64: Some("bm90IGEgcGVt".into()), // "not a pem"
        ..Default::default()
    })));
    let token = sign(&claims_with_roles(&["ADMIN"]));

    let (status, body) = call(protected(broken), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, denied("Internal Server Error - Missing configuration"));
}

#[tokio::test]
async fn rsa_key_that_cannot_verify_is_a_service_fault() {
    let broken = AuthGate::new(Arc::new(AuthService::new(common::settings_with_pem(
        common::BROKEN_RSA_PUBLIC_PEM,
    ))));
    let token = sign(&claims_with_roles(&["ADMIN"]));

    let (status, body) = call(protected(broken), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, denied("Internal Server Error - Missing configuration"));
}

#[tokio::test]
async fn pkcs1_public_key_is_not_accepted_as_spki() {
    let pkcs1 = AuthGate::new(Arc::new(AuthService::new(common::settings_with_pem(
        common::ISSUER_PUBLIC_PKCS1_PEM,
    ))));
    let token = sign(&claims_with_roles(&[]));

    let (status, body) = call(protected(pkcs1), "/protected", Some(bearer(&token).as_str())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, denied("Internal Server Error - Missing configuration"));
}

#[tokio::test]
async fn missing_token_is_checked_before_configuration() {
    let unconfigured = AuthGate::new(Arc::new(AuthService::new(AuthSettings::default())));

    let (status, body) = call(protected(unconfigured), "/protected", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, denied("Unauthorized - No Token"));
}

#[tokio::test]
async fn same_token_twice_is_allowed_twice() {
    let token = sign(&claims_with_roles(&["ADMIN"]));
    let router = protected(gate().with_roles([Role::Admin]));

    let first = call(router.clone(), "/protected", Some(bearer(&token).as_str())).await;
    let second = call(router, "/protected", Some(bearer(&token).as_str())).await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn issuer_and_audience_are_enforced_when_configured() {
    let service = Arc::new(AuthService::new(AuthSettings {
        issuer: Some("https://auth.good-food.test".into()),
        audience: Some("orders".into()),
        ..common::settings()
    }));

    let mut claims = claims_with_roles(&[]);
    claims["iss"] = json!("https://auth.good-food.test");
    claims["aud"] = json!("orders");
    let (status, _) = call(
        protected(AuthGate::new(service.clone())),
        "/protected",
        Some(bearer(&sign(&claims)).as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    claims["aud"] = json!("billing");
    let (status, _) = call(
        protected(AuthGate::new(service)),
        "/protected",
        Some(bearer(&sign(&claims)).as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn audience_in_token_is_ignored_when_not_configured() {
    let mut claims = claims_with_roles(&[]);
    claims["aud"] = json!("some-other-service");

    let (status, _) = call(
        protected(gate()),
        "/protected",
        Some(bearer(&sign(&claims)).as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn check_is_safe_to_run_concurrently() {
    let gate = gate().with_roles([Role::FranchiseOwner]);
    let token = sign(&claims_with_roles(&["FRANCHISE_OWNER"]));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let gate = gate.clone();
            let value = bearer(&token);
            tokio::spawn(async move {
                let mut headers = axum::http::HeaderMap::new();
                headers.insert(axum::http::header::AUTHORIZATION, value.parse().unwrap());
                gate.check(&headers).map(|id| id.subject().to_string())
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), Ok("7c1f7a4e-user".to_string()));
    }
}

#[tokio::test]
async fn check_reports_each_terminal_state() {
    use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

    let headers = |v: &str| {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        h
    };
    let gate = gate().with_roles([Role::Admin]);

    assert_eq!(gate.check(&HeaderMap::new()).unwrap_err(), AuthError::NoToken);
    assert_eq!(gate.check(&headers("Bearer ")).unwrap_err(), AuthError::EmptyToken);
    assert_eq!(gate.check(&headers("Bearer x.y.z")).unwrap_err(), AuthError::InvalidToken);

    let customer = sign(&claims_with_roles(&["CUSTOMER"]));
    assert_eq!(
        gate.check(&headers(&bearer(&customer))).unwrap_err(),
        AuthError::Forbidden
    );

    let admin = sign(&claims_with_roles(&["ADMIN", "CUSTOMER"]));
    let identity = gate.check(&headers(&bearer(&admin))).unwrap();
    assert_eq!(identity.roles(), vec![Role::Admin, Role::Customer]);
    assert_eq!(identity.email(), Some("staff@good-food.test"));
}
