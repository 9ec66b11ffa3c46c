//! services/client/tests/common/mod.rs
//!
//! An in-process mock of the portal backend. It serves the REST routes the
//! client calls, records every request it receives, and lets a test flip a
//! few switches (expired token, failing logout, slow search).

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use client_lib::adapters::MemorySessionStorage;
use client_lib::config::Config;
use client_lib::views::AppState;
use parking_lot::Mutex;
use pdf_portal_core::domain::{Session, User};
use pdf_portal_core::ports::SessionStorage;
use serde::Deserialize;
use serde_json::{json, Value};

pub const TOKEN: &str = "tok-alice";
pub const PASSWORD: &str = "secret1";
pub const SHARE_TOKEN: &str = "share-abc";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// A multipart upload as the backend saw it.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct Backend {
    pub requests: Mutex<Vec<Recorded>>,
    pub documents: Mutex<Vec<Value>>,
    pub comments: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    /// Every authenticated route answers 401.
    pub token_expired: AtomicBool,
    /// `POST /auth/logout` answers 500.
    pub logout_fails: AtomicBool,
    /// A wrong password is answered with 401 instead of 400.
    pub login_answers_401: AtomicBool,
    /// `POST /auth/reset-password` answers 500.
    pub reset_fails: AtomicBool,
    pub search_delay: Mutex<Option<Duration>>,
}

impl Backend {
    pub fn with_documents(documents: Vec<Value>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn expire_token(&self) {
        self.token_expired.store(true, Ordering::SeqCst);
    }
}

pub fn document(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "originalname": name,
        "size": 2048,
        "createdAt": "2024-03-01T10:00:00.000Z",
        "ownerId": "u1",
        "shared": false,
        "url": format!("/uploads/{}", name),
    })
}

pub fn alice() -> User {
    User {
        id: "u1".to_string(),
        email: "alice@example.com".to_string(),
        name: "Alice".to_string(),
        created_at: None,
    }
}

fn alice_json() -> Value {
    json!({ "_id": "u1", "email": "alice@example.com", "name": "Alice" })
}

//=========================================================================================
// Middleware
//=========================================================================================

async fn record(State(backend): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.requests.lock().push(Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization,
    });
    next.run(req).await
}

async fn require_bearer(
    State(backend): State<Arc<Backend>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if backend.token_expired.load(Ordering::SeqCst) || bearer != Some(TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

//=========================================================================================
// Handlers
//=========================================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Credentials>) -> Response {
    if body.password != PASSWORD && backend.login_answers_401.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Wrong password for this account" })),
        )
            .into_response();
    }
    if body.password != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response();
    }
    let mut user = alice_json();
    user["email"] = Value::String(body.email);
    Json(json!({ "token": TOKEN, "user": user })).into_response()
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
}

async fn register(Json(body): Json<Registration>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "token": TOKEN,
            "user": { "_id": "u1", "email": body.email, "name": body.name },
        })),
    )
        .into_response()
}

async fn logout(State(backend): State<Arc<Backend>>) -> Response {
    if backend.logout_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn reset_password(State(backend): State<Arc<Backend>>) -> StatusCode {
    if backend.reset_fails.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn me() -> Json<Value> {
    Json(json!({ "user": alice_json() }))
}

async fn list_documents(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.documents.lock().clone()))
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

async fn search_documents(
    State(backend): State<Arc<Backend>>,
    axum::extract::Query(params): axum::extract::Query<SearchParams>,
) -> Json<Value> {
    let delay = *backend.search_delay.lock();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let hits: Vec<Value> = backend
        .documents
        .lock()
        .iter()
        .filter(|d| {
            d["name"]
                .as_str()
                .is_some_and(|name| name.contains(&params.query))
        })
        .cloned()
        .collect();
    Json(json!({ "pdfs": hits }))
}

async fn upload(
    State(backend): State<Arc<Backend>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "No file".to_string()))?;
    let received = ReceivedUpload {
        field: field.name().unwrap_or_default().to_string(),
        file_name: field.file_name().unwrap_or_default().to_string(),
        content_type: field.content_type().map(str::to_string),
        size: 0,
        data: Vec::new(),
    };
    let data = field
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let received = ReceivedUpload {
        size: data.len(),
        data: data.to_vec(),
        ..received
    };

    let record = json!({
        "_id": "p-new",
        "name": "stored-by-server.pdf",
        "originalname": received.file_name,
        "size": received.size,
        "createdAt": "2024-03-02T08:30:00Z",
        "ownerId": "u1",
        "shared": false,
        "url": "/uploads/stored-by-server.pdf",
    });
    backend.uploads.lock().push(received);
    backend.documents.lock().insert(0, record.clone());
    Ok((StatusCode::CREATED, Json(json!({ "pdf": record }))))
}

async fn view_document(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Response {
    match backend
        .documents
        .lock()
        .iter()
        .find(|d| d["_id"] == id.as_str())
    {
        Some(document) => Json(document.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "PDF not found" })),
        )
            .into_response(),
    }
}

async fn delete_document(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut documents = backend.documents.lock();
    let before = documents.len();
    documents.retain(|d| d["_id"] != id.as_str());
    if documents.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn share_document(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "message": "Share link created",
        "shareableLink": { "_id": "link-1", "pdfId": id, "token": SHARE_TOKEN },
    }))
}

async fn shared_document(
    State(backend): State<Arc<Backend>>,
    Path(token): Path<String>,
) -> Response {
    let first = backend.documents.lock().first().cloned();
    match first {
        Some(document) if token == SHARE_TOKEN => Json(json!({ "pdf": document })).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Share link not found" })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct Content {
    content: String,
}

fn comment(id: &str, pdf_id: &str, content: &str, parent_id: Option<&str>) -> Value {
    json!({
        "_id": id,
        "content": content,
        "userId": { "_id": "u1", "name": "Alice" },
        "userName": "Alice",
        "pdfId": pdf_id,
        "parentId": parent_id,
        "createdAt": 1709287200000_i64,
    })
}

async fn list_comments(
    State(backend): State<Arc<Backend>>,
    Path(pdf_id): Path<String>,
) -> Json<Value> {
    let comments: Vec<Value> = backend
        .comments
        .lock()
        .iter()
        .filter(|c| c["pdfId"] == pdf_id.as_str())
        .cloned()
        .collect();
    Json(json!({ "comments": comments }))
}

async fn create_comment(
    State(backend): State<Arc<Backend>>,
    Path(pdf_id): Path<String>,
    Json(body): Json<Content>,
) -> (StatusCode, Json<Value>) {
    let mut comments = backend.comments.lock();
    let id = format!("c{}", comments.len() + 1);
    let created = comment(&id, &pdf_id, &body.content, None);
    comments.push(created.clone());
    (StatusCode::CREATED, Json(created))
}

async fn update_comment(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    Json(body): Json<Content>,
) -> Response {
    let mut comments = backend.comments.lock();
    match comments.iter_mut().find(|c| c["_id"] == id.as_str()) {
        Some(existing) => {
            existing["content"] = Value::String(body.content);
            // The backend answers without the parent reference.
            let mut updated = existing.clone();
            updated["parentId"] = Value::Null;
            Json(json!({ "comment": updated })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_comment(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> StatusCode {
    backend.comments.lock().retain(|c| c["_id"] != id.as_str());
    StatusCode::OK
}

async fn reply_comment(
    State(backend): State<Arc<Backend>>,
    Path(parent_id): Path<String>,
    Json(body): Json<Content>,
) -> Response {
    let mut comments = backend.comments.lock();
    let Some(pdf_id) = comments
        .iter()
        .find(|c| c["_id"] == parent_id.as_str())
        .and_then(|c| c["pdfId"].as_str().map(str::to_string))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let id = format!("c{}", comments.len() + 1);
    let created = comment(&id, &pdf_id, &body.content, Some(&parent_id));
    comments.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

//=========================================================================================
// Server
//=========================================================================================

pub fn router(backend: Arc<Backend>) -> Router {
    let public = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/reset-password", post(reset_password))
        .route("/pdfs/shared/{token}", get(shared_document));

    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/update-password", post(|| async { StatusCode::OK }))
        .route("/pdfs/all", get(list_documents))
        .route("/pdfs/search", get(search_documents))
        .route("/pdfs/upload", post(upload))
        .route("/pdfs/view/pdf/{id}", get(view_document))
        .route("/pdfs/share/{id}", post(share_document))
        .route("/pdfs/{id}", delete(delete_document))
        .route(
            "/comments/{id}",
            get(list_comments)
                .post(create_comment)
                .put(update_comment)
                .delete(delete_comment),
        )
        .route("/comments/reply/{id}", post(reply_comment))
        .route_layer(middleware::from_fn_with_state(
            backend.clone(),
            require_bearer,
        ));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

/// Binds the mock backend on an ephemeral local port.
pub async fn spawn(backend: Arc<Backend>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn config(addr: SocketAddr) -> Config {
    let base = format!("http://{}/api", addr);
    Config::from_lookup(|key| match key {
        "API_BASE_URL" => Some(base.clone()),
        "APP_ORIGIN" => Some("http://portal.test".to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("10".to_string()),
        _ => None,
    })
    .unwrap()
}

/// A running backend plus client state wired to it.
pub struct Harness {
    pub backend: Arc<Backend>,
    pub storage: Arc<MemorySessionStorage>,
    pub app: AppState,
}

impl Harness {
    pub async fn anonymous(backend: Backend) -> Self {
        Self::start(backend, None).await
    }

    /// Starts with Alice's session already persisted, as after a restart.
    pub async fn signed_in(backend: Backend) -> Self {
        let session = Session {
            token: TOKEN.to_string(),
            user: alice(),
        };
        Self::start(backend, Some(session)).await
    }

    async fn start(backend: Backend, session: Option<Session>) -> Self {
        let backend = Arc::new(backend);
        let addr = spawn(backend.clone()).await;
        let storage = Arc::new(MemorySessionStorage::default());
        if let Some(session) = session {
            storage.store(&session).unwrap();
        }
        let app = AppState::new(Arc::new(config(addr)), storage.clone()).unwrap();
        Self {
            backend,
            storage,
            app,
        }
    }
}
