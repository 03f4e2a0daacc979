#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use helpdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use helpdesk_api::config::ServerConfig;
use helpdesk_api::router::build_app_router;
use helpdesk_api::state::AppState;
use helpdesk_db::models::user::{CreateUser, User};
use helpdesk_db::store::{MemoryTicketStore, TicketStore};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        recent_activity_limit: 20,
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The full application router over an in-memory store, plus a handle on
/// that store for seeding and inspecting state.
///
/// The router is built by the same [`build_app_router`] the binary uses, so
/// tests exercise the production middleware stack.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTicketStore>,
    pub config: ServerConfig,
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryTicketStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
    };
    TestApp {
        router: build_app_router(state, &config),
        store,
        config,
    }
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub async fn user(&self, full_name: &str, role: &str) -> User {
        self.store
            .create_user(&CreateUser {
                full_name: full_name.to_string(),
                email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
                role: role.to_string(),
            })
            .await
            .unwrap()
    }

    /// Seed a user and mint a bearer token for them.
    pub async fn login(&self, full_name: &str, role: &str) -> (User, String) {
        let user = self.user(full_name, role).await;
        let token = self.token(&user);
        (user, token)
    }

    pub fn token(&self, user: &User) -> String {
        generate_access_token(user.id, &user.role, &self.config.jwt).unwrap()
    }

    /// Create a ticket through the API and return its id.
    pub async fn create_ticket(&self, token: &str, title: &str) -> i64 {
        let response = post_json(
            self.app(),
            "/api/v1/tickets",
            token,
            serde_json::json!({ "title": title, "description": "seeded" }),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }

    /// Assign a technician through the API, asserting success.
    pub async fn assign(&self, token: &str, ticket_id: i64, user_id: i64, is_primary: bool) {
        let response = post_json(
            self.app(),
            &format!("/api/v1/tickets/{ticket_id}/assignees"),
            token,
            serde_json::json!({ "user_id": user_id, "is_primary": is_primary }),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_json_anon(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_anon(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
