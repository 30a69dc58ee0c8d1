//! Common test utilities for integration tests
//!
//! `FakeBackend` is an in-process axum server that answers stubbed routes
//! and records every request it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use maintenance_desk::api::ApiClient;
use maintenance_desk::auth::{SessionContext, TokenStore};
use maintenance_desk::data::{Role, UserProfile};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// One request as seen by the backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct Stub {
    status: u16,
    body: Value,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct BackendState {
    stubs: Arc<Mutex<HashMap<(String, String), Stub>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Fake ticketing backend
pub struct FakeBackend {
    pub addr: String,
    state: BackendState,
}

impl FakeBackend {
    /// Bind to a random port and start serving
    pub async fn start() -> Self {
        let state = BackendState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Answer `method path` with `status` and a JSON body
    pub fn stub(&self, method: &str, path: &str, status: u16, body: Value) {
        self.insert(method, path, Stub {
            status,
            body,
            delay: None,
        });
    }

    pub fn ok(&self, method: &str, path: &str, body: Value) {
        self.stub(method, path, 200, body);
    }

    pub fn fail(&self, method: &str, path: &str, status: u16, message: &str) {
        self.stub(method, path, status, json!({ "message": message }));
    }

    /// Answer after `delay`
    pub fn slow(&self, method: &str, path: &str, delay: Duration, body: Value) {
        self.insert(method, path, Stub {
            status: 200,
            body,
            delay: Some(delay),
        });
    }

    fn insert(&self, method: &str, path: &str, stub: Stub) {
        self.state
            .stubs
            .lock()
            .unwrap()
            .insert((method.to_uppercase(), path.to_string()), stub);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn reset_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }

    /// API client with an in-memory session, signed in when `token` is set
    pub async fn client(&self, token: Option<&str>) -> Arc<ApiClient> {
        self.client_with_store(token, TokenStore::ephemeral()).await
    }

    pub async fn client_with_store(&self, token: Option<&str>, store: TokenStore) -> Arc<ApiClient> {
        let session = Arc::new(SessionContext::new(store));
        if let Some(token) = token {
            session.begin(token.to_string(), None).await.unwrap();
        }
        Arc::new(ApiClient::with_http_client(
            reqwest::Client::new(),
            &self.addr,
            session,
        ))
    }

    /// Client signed in as `role`
    pub async fn client_as(&self, role: Role) -> Arc<ApiClient> {
        let session = Arc::new(SessionContext::new(TokenStore::ephemeral()));
        session
            .begin("token-123".to_string(), Some(user(role)))
            .await
            .unwrap();
        Arc::new(ApiClient::with_http_client(
            reqwest::Client::new(),
            &self.addr,
            session,
        ))
    }
}

async fn handle(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body_json = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body_json,
    });

    let stub = state
        .stubs
        .lock()
        .unwrap()
        .get(&(method.to_string(), path))
        .cloned();

    let Some(stub) = stub else {
        return (StatusCode::NOT_FOUND, axum::Json(json!({ "message": "not found" })))
            .into_response();
    };

    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(stub.status).unwrap();
    (status, axum::Json(stub.body)).into_response()
}

pub fn user(role: Role) -> UserProfile {
    UserProfile {
        id: "7".to_string(),
        email: Some("user@example.com".to_string()),
        role,
        first_name: Some("Sam".to_string()),
        last_name: Some("Reyes".to_string()),
    }
}

/// Backend-shaped ticket record
pub fn ticket_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "ticket_number": format!("TK-{}", id),
        "title": format!("Ticket {}", id),
        "complaint": "Something is broken",
        "job_type": "Plumbing",
        "location": "Unit 4B",
        "priority": "medium",
        "status": status,
        "created_at": "2025-03-04T09:15:30.000Z"
    })
}
