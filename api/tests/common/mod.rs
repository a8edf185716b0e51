#![allow(dead_code)]

use agora_api::middleware::auth::{issue_token, Role};
use agora_api::{build_router, ApiState, ServerConfig};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub fn server() -> TestServer {
    let config = ServerConfig {
        jwt_secret: SECRET.into(),
        ..Default::default()
    };
    TestServer::new(build_router(ApiState::in_memory(SECRET), &config)).unwrap()
}

/// A signed-in caller
pub struct Caller {
    pub id: Uuid,
    pub token: String,
}

impl Caller {
    pub fn new(role: Role) -> Self {
        let id = Uuid::new_v4();
        let token = issue_token(SECRET, id, &format!("{id}@agora.test"), role, chrono::Duration::hours(1)).unwrap();
        Self { id, token }
    }

    pub fn member() -> Self {
        Self::new(Role::Member)
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Caller whose token carries an arbitrary role string
    pub fn with_role(role: &str) -> Self {
        let id = Uuid::new_v4();
        let claims = serde_json::json!({
            "sub": id,
            "email": format!("{id}@agora.test"),
            "role": role,
            "exp": (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        Self { id, token }
    }

    pub fn bearer(&self) -> (HeaderName, HeaderValue) {
        (
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        )
    }

    pub fn cookie(&self) -> (HeaderName, HeaderValue) {
        (
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("token={}", self.token)).unwrap(),
        )
    }
}
