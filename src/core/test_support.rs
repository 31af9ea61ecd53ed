//! In-process mock of the school API for tests
//!
//! Serves `/api/...` from an axum router bound to an ephemeral port and
//! records every request it receives.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Value, json};

use crate::core::config::{Config, RefreshPolicy};
use crate::core::http::ApiContext;
use crate::core::navigation::RecordingNavigator;
use crate::core::store::{MemoryStorage, TokenStore};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    Issue {
        access_token: String,
        refresh_token: Option<String>,
    },
    Reject,
}

impl RefreshBehavior {
    pub fn issue(access_token: &str) -> Self {
        RefreshBehavior::Issue {
            access_token: access_token.to_string(),
            refresh_token: None,
        }
    }

    pub fn issue_rotated(access_token: &str, refresh_token: &str) -> Self {
        RefreshBehavior::Issue {
            access_token: access_token.to_string(),
            refresh_token: Some(refresh_token.to_string()),
        }
    }
}

struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    accepted_token: Mutex<Option<String>>,
    refresh: Mutex<RefreshBehavior>,
    refresh_calls: AtomicUsize,
    auth_response: Mutex<Value>,
}

pub struct MockApi {
    state: Arc<MockState>,
    addr: SocketAddr,
}

impl MockApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            accepted_token: Mutex::new(None),
            refresh: Mutex::new(RefreshBehavior::Reject),
            refresh_calls: AtomicUsize::new(0),
            auth_response: Mutex::new(json!({
                "access_token": "T1",
                "refresh_token": "R1",
                "user": {"user_id": 1, "email": "a@b.com", "role": "officer"}
            })),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock api");
        });

        Self { state, addr }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Protected routes answer 401 unless they carry this bearer token
    pub fn accept_only(&self, token: &str) {
        *self.state.accepted_token.lock().unwrap() = Some(token.to_string());
    }

    pub fn on_refresh(&self, behavior: RefreshBehavior) {
        *self.state.refresh.lock().unwrap() = behavior;
    }

    /// Body returned by `/auth/login` and `/auth/register`
    pub fn set_auth_response(&self, body: Value) {
        *self.state.auth_response.lock().unwrap() = body;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }
}

pub fn test_context(
    mock: &MockApi,
    policy: RefreshPolicy,
) -> (ApiContext, Arc<RecordingNavigator>) {
    context_for(&mock.base_url(), policy)
}

pub fn context_for(base_url: &str, policy: RefreshPolicy) -> (ApiContext, Arc<RecordingNavigator>) {
    context_with_config(
        Config::new(base_url)
            .unwrap()
            .with_refresh_policy(policy),
    )
}

pub fn context_with_config(config: Config) -> (ApiContext, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = ApiContext::new(config, TokenStore::in_memory(), navigator.clone()).unwrap();
    (ctx, navigator)
}

pub fn context_with_storage(
    mock: &MockApi,
    storage: Arc<MemoryStorage>,
) -> (ApiContext, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = ApiContext::new(
        Config::new(&mock.base_url()).unwrap(),
        TokenStore::new(storage),
        navigator.clone(),
    )
    .unwrap();
    (ctx, navigator)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = header_value(&headers, header::AUTHORIZATION);
    let path = uri.path().to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: body.clone(),
    });

    match path.as_str() {
        "/api/auth/login" | "/api/auth/register" => {
            if body["password"] == "wrong" {
                return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
            }
            let response = state.auth_response.lock().unwrap().clone();
            return Json(response).into_response();
        }
        "/api/auth/refresh" => {
            state.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let behavior = state.refresh.lock().unwrap().clone();
            return match behavior {
                RefreshBehavior::Issue {
                    access_token,
                    refresh_token,
                } => {
                    let mut response = json!({
                        "access_token": access_token,
                        "token_type": "bearer"
                    });
                    if let Some(refresh_token) = refresh_token {
                        response["refresh_token"] = json!(refresh_token);
                    }
                    Json(response).into_response()
                }
                RefreshBehavior::Reject => {
                    message(StatusCode::UNAUTHORIZED, "Invalid refresh token")
                }
            };
        }
        "/api/empty" => return StatusCode::NO_CONTENT.into_response(),
        "/api/fail/500" => {
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
        "/api/fail/403" => return message(StatusCode::FORBIDDEN, "Forbidden"),
        _ => {}
    }

    let accepted = state.accepted_token.lock().unwrap().clone();
    if let Some(accepted) = accepted {
        if authorization.as_deref() != Some(format!("Bearer {accepted}").as_str()) {
            return message(StatusCode::UNAUTHORIZED, "Token expired");
        }
    }

    match path.as_str() {
        "/api/auth/me" => Json(json!({
            "user_id": 1,
            "email": "a@b.com",
            "role": "officer",
            "name": "Ada"
        }))
        .into_response(),
        "/api/auth/validate" => Json(json!({ "valid": true })).into_response(),
        _ => Json(json!({
            "method": method.to_string(),
            "path": path,
            "query": uri.query(),
            "body": body,
        }))
        .into_response(),
    }
}
