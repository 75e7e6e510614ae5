//! In-process harness for handler tests: the real router over an in-memory
//! store, driven one request at a time with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::models::UNIQUE_KEYS;
use crate::database::{MemoryDocumentStore, ReferencePolicies};
use crate::middleware::TOKEN_HEADER;
use crate::state::AppState;

/// Password given to every fixture user.
pub const PASSWORD: &str = "password123";

pub struct TestContext {
    pub state: AppState,
    router: Router,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A stored child together with the records created to hold it.
#[derive(Debug, Clone, Copy)]
pub struct ChildFixture {
    pub id: Uuid,
    pub group_id: Uuid,
    pub parent_id: Uuid,
    pub program_id: Uuid,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "test-secret".to_string();
        config.api.enable_request_logging = false;
        configure(&mut config);

        let store = Arc::new(MemoryDocumentStore::with_unique_keys(UNIQUE_KEYS));
        let state = AppState::new(config, store).expect("test state");
        Self::from_state(state)
    }

    pub fn with_policies(policies: ReferencePolicies) -> Self {
        let state = Self::new().state.with_policies(policies);
        Self::from_state(state)
    }

    fn from_state(state: AppState) -> Self {
        let router = app(state.clone());
        Self { state, router }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("infallible router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri, None, None).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.request("GET", uri, None, Some(token)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request("PUT", uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request("DELETE", uri, None, None).await
    }

    pub async fn delete_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.request("DELETE", uri, None, Some(token)).await
    }

    async fn create(&self, uri: &str, body: Value) -> Uuid {
        let res = self.post(uri, body).await;
        assert_eq!(res.status, StatusCode::CREATED, "POST {} failed: {}", uri, res.body);
        res.body["id"].as_str().and_then(|id| id.parse().ok()).expect("created id")
    }

    pub async fn register(&self, role: &str, email: &str) -> Uuid {
        self.create(
            "/api/users/register",
            json!({"role": role, "name": "Fixture User", "email": email, "password": PASSWORD}),
        )
        .await
    }

    pub async fn create_parent(&self, email: &str) -> Uuid {
        self.register("parent", email).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .post("/api/users/login", json!({"email": email, "password": password}))
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().expect("token").to_string()
    }

    /// Registers a fresh admin and logs in as them.
    pub async fn admin_token(&self) -> String {
        let email = format!("admin-{}@example.com", Uuid::new_v4().simple());
        self.register("admin", &email).await;
        self.login(&email, PASSWORD).await
    }

    pub async fn create_program(&self, name: &str) -> Uuid {
        self.create(
            "/api/programs",
            json!({"name": name, "duration": "12 weeks", "stages": [{"name": "Intro", "description": "First steps"}]}),
        )
        .await
    }

    pub async fn create_group(&self, program_id: Uuid) -> Uuid {
        self.create(
            "/api/groups",
            json!({"name": "Tigers", "schedule": "Mon 16:00", "programId": program_id}),
        )
        .await
    }

    /// A child in a new group of a new program, with a new parent.
    pub async fn create_child(&self, name: &str) -> ChildFixture {
        let program_id = self.create_program("Robotics").await;
        let group_id = self.create_group(program_id).await;
        let parent_id = self
            .create_parent(&format!("parent-{}@example.com", Uuid::new_v4().simple()))
            .await;
        let id = self
            .create(
                "/api/children",
                json!({
                    "name": name,
                    "dateOfBirth": "2016-05-04",
                    "groupId": group_id,
                    "parentId": parent_id
                }),
            )
            .await;

        ChildFixture {
            id,
            group_id,
            parent_id,
            program_id,
        }
    }
}
