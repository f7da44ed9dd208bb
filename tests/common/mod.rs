//! Shared fixtures: a fake identity provider and an in-process mock backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use foundry_chat::auth::IdentityProvider;
use foundry_chat::core::{AccessToken, Account, TokenRequest};
use foundry_chat::{App, ChatError, Config, Result};

pub const SILENT_TOKEN: &str = "silent-token";
pub const INTERACTIVE_TOKEN: &str = "interactive-token";

/// Identity provider that never leaves the process
#[derive(Default)]
pub struct FakeIdentity {
    pub fail_login: bool,
    pub fail_logout: bool,
    pub needs_interaction: bool,
    pub logins: AtomicUsize,
    pub logouts: AtomicUsize,
    pub interactive_tokens: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_login() -> Arc<Self> {
        Arc::new(Self {
            fail_login: true,
            ..Self::default()
        })
    }

    pub fn failing_logout() -> Arc<Self> {
        Arc::new(Self {
            fail_logout: true,
            ..Self::default()
        })
    }

    pub fn requiring_interaction() -> Arc<Self> {
        Arc::new(Self {
            needs_interaction: true,
            ..Self::default()
        })
    }

    fn token(secret: &str, request: &TokenRequest) -> AccessToken {
        AccessToken {
            secret: secret.to_string(),
            expires_at: u64::MAX,
            scopes: request.scopes.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn login_interactive(&self, _scopes: &[String]) -> Result<Account> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if self.fail_login {
            return Err(ChatError::auth("Sign-in failed: access_denied"));
        }
        Ok(Account {
            username: "ada@contoso.com".to_string(),
            home_account_id: "oid-1.tid-1".to_string(),
            name: Some("Ada".to_string()),
        })
    }

    async fn logout(&self, _account: &Account) -> Result<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(ChatError::auth("logout failed"));
        }
        Ok(())
    }

    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AccessToken> {
        if self.needs_interaction {
            return Err(ChatError::interaction_required("consent_required"));
        }
        Ok(Self::token(SILENT_TOKEN, request))
    }

    async fn acquire_token_interactive(&self, request: &TokenRequest) -> Result<AccessToken> {
        self.interactive_tokens.fetch_add(1, Ordering::SeqCst);
        Ok(Self::token(INTERACTIVE_TOKEN, request))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// One request the mock backend received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

struct BackendState {
    agents: (u16, Value),
    chat: (u16, Value),
    requests: Vec<Recorded>,
}

/// Mock `/agents` + `/chat` backend with swappable responses
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
    pub base_url: String,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(BackendState {
            agents: (
                200,
                json!({"agents": [{"agent_id": "a1", "display_name": "Agent One"}]}),
            ),
            chat: (200, json!({"answer": "hi there"})),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/agents", get(agents_handler))
            .route("/chat", post(chat_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn set_agents(&self, status: u16, body: Value) {
        self.state.lock().unwrap().agents = (status, body);
    }

    pub fn set_chat(&self, status: u16, body: Value) {
        self.state.lock().unwrap().chat = (status, body);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn record(state: &Mutex<BackendState>, path: &str, headers: &HeaderMap, body: &[u8]) {
    state.lock().unwrap().requests.push(Recorded {
        path: path.to_string(),
        authorization: header(headers, "authorization"),
        content_type: header(headers, "content-type"),
        request_id: header(headers, "x-request-id"),
        body: serde_json::from_slice(body).ok(),
    });
}

async fn agents_handler(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record(&state, "/agents", &headers, &[]);
    let (status, body) = state.lock().unwrap().agents.clone();
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn chat_handler(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    record(&state, "/chat", &headers, &body);
    let (status, body) = state.lock().unwrap().chat.clone();
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

pub fn config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.auth.tenant_id = "contoso".to_string();
    config.auth.client_id = "client-123".to_string();
    config.auth.api_scope = "api://backend/.default".to_string();
    config
}

pub fn app(backend: &MockBackend, identity: Arc<FakeIdentity>) -> App {
    App::with_provider(&config(&backend.base_url), identity).unwrap()
}

/// App already signed in with agents loaded from `backend`
pub async fn signed_in_app(backend: &MockBackend) -> App {
    let mut app = app(backend, FakeIdentity::new());
    app.sign_in().await;
    assert_eq!(app.error(), None);
    app
}
