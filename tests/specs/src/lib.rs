// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end tests.
//!
//! Serves a small in-process ticketing API over real HTTP and spawns the
//! `ticketline` binary against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "correct-horse";
/// Email of the seeded account.
pub const EMAIL: &str = "ada@example.com";

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `ticketline` binary.
pub fn ticketline_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("ticketline")
}

struct Tokens {
    access: String,
    refresh: String,
    issued: usize,
}

#[derive(Default)]
struct Counters {
    refresh: AtomicUsize,
    logout: AtomicUsize,
}

/// Shared server state.
pub struct MockState {
    tokens: Mutex<Tokens>,
    tickets: Mutex<HashMap<String, Vec<Value>>>,
    last_query: Mutex<HashMap<String, String>>,
    counters: Counters,
}

/// A running mock API, aborted on drop.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Bind to a random local port and serve the API under `/api`.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            tokens: Mutex::new(Tokens {
                access: "access-0".into(),
                refresh: "refresh-0".into(),
                issued: 0,
            }),
            tickets: Mutex::new(seed_tickets()),
            last_query: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        });

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/register", post(register))
            .route("/api/auth/forgot-password", post(forgot_password))
            .route("/api/{kind}", get(list_tickets).post(create_ticket))
            .route("/api/{kind}/{id}", get(get_ticket))
            .route("/api/{kind}/{id}/status", patch(transition_ticket))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(Self { addr, state, handle })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Revoke the access credential so the next call gets a 401.
    pub fn expire_access(&self) {
        self.state.tokens.lock().access = "revoked".into();
    }

    pub fn current_access(&self) -> String {
        self.state.tokens.lock().access.clone()
    }

    pub fn current_refresh(&self) -> String {
        self.state.tokens.lock().refresh.clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.counters.refresh.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.state.counters.logout.load(Ordering::SeqCst)
    }

    /// Query parameters of the most recent list call.
    pub fn last_query(&self) -> HashMap<String, String> {
        self.state.last_query.lock().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run the binary against `server` with credentials persisted under
/// `state_dir`.
pub async fn run_cli(server: &MockServer, state_dir: &Path, args: &[&str]) -> anyhow::Result<Output> {
    let binary = ticketline_binary();
    anyhow::ensure!(binary.exists(), "ticketline binary not found at {}", binary.display());

    let output = tokio::process::Command::new(&binary)
        .args(["--base-url", &server.base_url(), "--logout-settle-ms", "10"])
        .args(args)
        .env("TICKETLINE_STATE_DIR", state_dir)
        .env("TICKETLINE_PASSWORD", PASSWORD)
        .env("RUST_LOG", "warn")
        .output()
        .await?;
    Ok(output)
}

fn seed_tickets() -> HashMap<String, Vec<Value>> {
    let mut tickets = HashMap::new();
    tickets.insert(
        "incidents".to_owned(),
        vec![
            json!({ "id": "INC-1", "title": "Printer on fire", "status": "open", "priority": "high" }),
            json!({ "id": "INC-2", "title": "VPN drops hourly", "status": "resolved", "priority": "low" }),
        ],
    );
    for kind in ["requests", "complaints", "queries"] {
        tickets.insert(kind.to_owned(), Vec::new());
    }
    tickets
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.tokens.lock().access);
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, "invalid username or password");
    }
    let tokens = state.tokens.lock();
    ok(json!({ "token": tokens.access, "refresh_token": tokens.refresh }))
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);
    let mut tokens = state.tokens.lock();
    if body["refresh_token"] != tokens.refresh.as_str() {
        return fail(StatusCode::UNAUTHORIZED, "refresh token expired");
    }
    tokens.issued += 1;
    tokens.access = format!("access-{}", tokens.issued);
    tokens.refresh = format!("refresh-{}", tokens.issued);
    ok(json!({ "token": tokens.access, "refresh_token": tokens.refresh }))
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    state.counters.logout.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true })).into_response()
}

async fn register(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.contains_key("authorization") {
        return fail(StatusCode::BAD_REQUEST, "unexpected credential");
    }
    if body["email"] == EMAIL {
        return Json(json!({ "success": false, "message": "email already registered" }))
            .into_response();
    }
    ok(json!({ "id": "user-2", "name": body["name"], "email": body["email"] }))
}

async fn forgot_password(Json(body): Json<Value>) -> Response {
    if body["email"] != EMAIL {
        return Json(json!({ "success": false, "message": "no account for that email" }))
            .into_response();
    }
    Json(json!({ "success": true, "message": "reset link sent" })).into_response()
}

async fn list_tickets(
    State(state): State<Arc<MockState>>,
    UrlPath(kind): UrlPath<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return fail(StatusCode::UNAUTHORIZED, "token expired");
    }
    let Some(all) = state.tickets.lock().get(&kind).cloned() else {
        return fail(StatusCode::NOT_FOUND, "unknown collection");
    };
    let matching: Vec<Value> = all
        .into_iter()
        .filter(|t| query.get("status").is_none_or(|s| t["status"] == s.as_str()))
        .filter(|t| {
            query.get("search").is_none_or(|s| {
                t["title"].as_str().unwrap_or_default().to_lowercase().contains(&s.to_lowercase())
            })
        })
        .collect();
    *state.last_query.lock() = query;
    ok(Value::Array(matching))
}

async fn get_ticket(
    State(state): State<Arc<MockState>>,
    UrlPath((kind, id)): UrlPath<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return fail(StatusCode::UNAUTHORIZED, "token expired");
    }
    let tickets = state.tickets.lock();
    match tickets.get(&kind).and_then(|all| all.iter().find(|t| t["id"] == id.as_str())) {
        Some(ticket) => ok(ticket.clone()),
        None => fail(StatusCode::NOT_FOUND, "no such ticket"),
    }
}

async fn create_ticket(
    State(state): State<Arc<MockState>>,
    UrlPath(kind): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return fail(StatusCode::UNAUTHORIZED, "token expired");
    }
    let mut tickets = state.tickets.lock();
    let Some(all) = tickets.get_mut(&kind) else {
        return fail(StatusCode::NOT_FOUND, "unknown collection");
    };
    let mut ticket = body;
    ticket["id"] = Value::String(format!("{}-{}", kind.to_uppercase(), all.len() + 1));
    ticket["status"] = Value::String("open".into());
    all.push(ticket.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": ticket }))).into_response()
}

async fn transition_ticket(
    State(state): State<Arc<MockState>>,
    UrlPath((kind, id)): UrlPath<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return fail(StatusCode::UNAUTHORIZED, "token expired");
    }
    let mut tickets = state.tickets.lock();
    let ticket = tickets
        .get_mut(&kind)
        .and_then(|all| all.iter_mut().find(|t| t["id"] == id.as_str()));
    match ticket {
        Some(ticket) => {
            ticket["status"] = body["status"].clone();
            ok(ticket.clone())
        }
        None => fail(StatusCode::NOT_FOUND, "no such ticket"),
    }
}
