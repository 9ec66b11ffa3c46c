//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation of
//! the `AuthService`, `DocumentService` and `CommentService` ports against the
//! backend REST API. It handles all interactions with the backend using `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use pdf_portal_core::domain::{
    Comment, Document, PasswordChange, Registration, Session, ShareLink, UploadFile, User,
};
use pdf_portal_core::ports::{
    AuthService, CommentService, DocumentService, PortError, PortResult, SessionStorage,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the backend ports over HTTP.
///
/// The bearer token is read from `storage` every time a request is built, so a
/// login or logout elsewhere in the process takes effect on the next call.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl HttpApiClient {
    /// Creates a new `HttpApiClient` with the configured timeout.
    pub fn new(config: &Config, storage: Arc<dyn SessionStorage>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url, storage))
    }

    /// Creates a new `HttpApiClient` around an existing `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &Url,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            storage,
        }
    }

    fn endpoint(&self, path: &str) -> PortResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| PortError::Unexpected(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Builds a request, attaching `Authorization: Bearer <token>` when a token
    /// is persisted.
    fn request(&self, method: Method, path: &str) -> PortResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(%method, path, "Sending request.");
        let builder = self.client.request(method, url);
        Ok(match self.storage.token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> PortResult<Response> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> PortResult<T> {
        let response = Self::send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to decode response: {}", e)))
    }

    async fn send_empty(builder: RequestBuilder) -> PortResult<()> {
        Self::send(builder).await.map(|_| ())
    }
}

/// Percent-encodes a single path segment or query value.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn transport_error(e: reqwest::Error) -> PortError {
    if e.is_decode() {
        PortError::Unexpected(e.to_string())
    } else {
        PortError::Network(e.to_string())
    }
}

/// Maps a non-success response to a `PortError`, keeping the backend's own
/// message when the body carries one.
fn status_error(status: StatusCode, body: &str) -> PortError {
    let backend = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PortError::Unauthorized(backend.unwrap_or_default())
        }
        _ => {
            let message = backend.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or_default().to_string()
            });
            if status == StatusCode::NOT_FOUND {
                PortError::NotFound(message)
            } else {
                PortError::Rejected {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

// Every field below is decoded leniently: a missing field, an explicit `null`
// and a value of an unexpected type all fall back to the default, so a single
// odd field never costs the whole record. Only a record without any id is
// rejected, in `to_domain`.

/// Ids arrive as strings or numbers depending on the backend's store, or as a
/// populated reference object carrying one.
fn id_from_value(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => ["_id", "id"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(id_from_value),
        _ => None,
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(id_from_value(&Value::deserialize(deserializer)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// The record id: `id` when the backend sends it, else Mongo's `_id`.
fn record_id(kind: &str, id: Option<String>, mongo_id: Option<String>) -> PortResult<String> {
    id.or(mongo_id)
        .ok_or_else(|| PortError::Unexpected(format!("{} record has no id", kind)))
}

/// Accepts RFC 3339 strings, naive ISO timestamps (taken as UTC) and epoch
/// milliseconds. Anything else is treated as an unknown date.
fn parse_timestamp(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    match raw? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Share links come back as a bare token or as an object holding one.
fn link_token(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => ["token", "id", "_id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Decodes each element of a list on its own. A bad element is logged and
/// skipped; the rest of the list is kept.
fn decode_each<R, T>(
    kind: &str,
    values: Vec<Value>,
    to_domain: impl Fn(R) -> PortResult<T>,
) -> Vec<T>
where
    R: DeserializeOwned,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let decoded = serde_json::from_value::<R>(value)
                .map_err(|e| PortError::Unexpected(e.to_string()))
                .and_then(&to_domain);
            match decoded {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable {} record.", kind);
                    None
                }
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default)]
    created_at: Option<Value>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            created_at: parse_timestamp(self.created_at.as_ref()),
            id: record_id("User", self.id, self.mongo_id)?,
            email: self.email,
            name: self.name,
        })
    }
}

#[derive(Deserialize)]
struct AuthRecord {
    token: String,
    user: UserRecord,
}
impl AuthRecord {
    fn to_domain(self) -> PortResult<Session> {
        Ok(Session {
            token: self.token,
            user: self.user.to_domain()?,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserPayload {
    Wrapped { user: UserRecord },
    Bare(UserRecord),
}
impl UserPayload {
    fn to_domain(self) -> PortResult<User> {
        match self {
            UserPayload::Wrapped { user } | UserPayload::Bare(user) => user.to_domain(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    originalname: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient_id")]
    owner_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    shared: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    file_url: String,
    #[serde(default, deserialize_with = "lenient_id")]
    uploaded_by: Option<String>,
    #[serde(default)]
    shareable_link: Option<Value>,
}
impl DocumentRecord {
    fn to_domain(self) -> PortResult<Document> {
        let name = if self.name.is_empty() {
            self.originalname.clone()
        } else {
            self.name
        };
        let url = if self.url.is_empty() {
            self.file_url
        } else {
            self.url
        };
        Ok(Document {
            id: record_id("Document", self.id, self.mongo_id)?,
            name,
            original_name: self.originalname,
            size: self.size,
            created_at: parse_timestamp(self.created_at.as_ref()),
            owner_id: self.owner_id.unwrap_or_default(),
            shared: self.shared,
            url,
            uploaded_by: self.uploaded_by,
            shareable_link: self.shareable_link.as_ref().and_then(link_token),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentPayload {
    Wrapped { pdf: DocumentRecord },
    Bare(DocumentRecord),
}
impl DocumentPayload {
    fn to_domain(self) -> PortResult<Document> {
        match self {
            DocumentPayload::Wrapped { pdf } | DocumentPayload::Bare(pdf) => pdf.to_domain(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentListPayload {
    Bare(Vec<Value>),
    Wrapped { pdfs: Vec<Value> },
    Other(Value),
}
impl DocumentListPayload {
    fn to_domain(self) -> Vec<Document> {
        match self {
            DocumentListPayload::Bare(values) | DocumentListPayload::Wrapped { pdfs: values } => {
                decode_each("document", values, DocumentRecord::to_domain)
            }
            DocumentListPayload::Other(value) => {
                warn!(payload = %value, "Document list response was not a list; showing none.");
                Vec::new()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareRecord {
    #[serde(default)]
    token: Option<Value>,
    #[serde(default)]
    shareable_link: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    content: String,
    #[serde(default, deserialize_with = "lenient_id")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    user_name: String,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient_id")]
    pdf_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    parent_id: Option<String>,
}
impl CommentRecord {
    fn to_domain(self) -> PortResult<Comment> {
        Ok(Comment {
            created_at: parse_timestamp(self.created_at.as_ref()),
            id: record_id("Comment", self.id, self.mongo_id)?,
            content: self.content,
            user_id: self.user_id.unwrap_or_default(),
            user_name: self.user_name,
            pdf_id: self.pdf_id.unwrap_or_default(),
            parent_id: self.parent_id,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentPayload {
    Wrapped { comment: CommentRecord },
    Bare(CommentRecord),
}
impl CommentPayload {
    fn to_domain(self) -> PortResult<Comment> {
        match self {
            CommentPayload::Wrapped { comment } | CommentPayload::Bare(comment) => {
                comment.to_domain()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentListPayload {
    Bare(Vec<Value>),
    Wrapped { comments: Vec<Value> },
    Other(Value),
}
impl CommentListPayload {
    fn to_domain(self) -> Vec<Comment> {
        match self {
            CommentListPayload::Bare(values) | CommentListPayload::Wrapped { comments: values } => {
                decode_each("comment", values, CommentRecord::to_domain)
            }
            CommentListPayload::Other(value) => {
                warn!(payload = %value, "Comment list response was not a list; showing none.");
                Vec::new()
            }
        }
    }
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for HttpApiClient {
    async fn register(&self, registration: &Registration) -> PortResult<Session> {
        let body = RegisterBody {
            email: &registration.email,
            password: &registration.password,
            name: &registration.name,
        };
        let request = self.request(Method::POST, "/auth/register")?.json(&body);
        Self::send_json::<AuthRecord>(request)
            .await
            .and_then(AuthRecord::to_domain)
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<Session> {
        let request = self
            .request(Method::POST, "/auth/login")?
            .json(&LoginBody { email, password });
        Self::send_json::<AuthRecord>(request)
            .await
            .and_then(AuthRecord::to_domain)
    }

    async fn logout(&self) -> PortResult<()> {
        Self::send_empty(self.request(Method::POST, "/auth/logout")?).await
    }

    async fn reset_password(&self, email: &str) -> PortResult<()> {
        let request = self
            .request(Method::POST, "/auth/reset-password")?
            .json(&ResetPasswordBody { email });
        Self::send_empty(request).await
    }

    async fn update_password(&self, change: &PasswordChange) -> PortResult<()> {
        let body = UpdatePasswordBody {
            user_id: change.user_id.as_deref(),
            old_password: &change.old_password,
            new_password: &change.new_password,
        };
        let request = self
            .request(Method::POST, "/auth/update-password")?
            .json(&body);
        Self::send_empty(request).await
    }

    async fn current_user(&self) -> PortResult<User> {
        Self::send_json::<UserPayload>(self.request(Method::GET, "/auth/me")?)
            .await
            .and_then(UserPayload::to_domain)
    }
}

//=========================================================================================
// `DocumentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentService for HttpApiClient {
    /// Uploads the file as the multipart field `pdf`. The record the server
    /// returns is used as is.
    async fn upload(&self, file: &UploadFile) -> PortResult<Document> {
        let part = Part::stream_with_length(Bytes::clone(&file.bytes), file.size())
            .file_name(file.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = Form::new().part("pdf", part);
        let request = self.request(Method::POST, "/pdfs/upload")?.multipart(form);
        Self::send_json::<DocumentPayload>(request)
            .await
            .and_then(DocumentPayload::to_domain)
    }

    async fn list(&self) -> PortResult<Vec<Document>> {
        Self::send_json::<DocumentListPayload>(self.request(Method::GET, "/pdfs/all")?)
            .await
            .map(DocumentListPayload::to_domain)
    }

    async fn get(&self, document_id: &str) -> PortResult<Document> {
        let path = format!("/pdfs/view/pdf/{}", encode(document_id));
        Self::send_json::<DocumentPayload>(self.request(Method::GET, &path)?)
            .await
            .and_then(DocumentPayload::to_domain)
    }

    async fn delete(&self, document_id: &str) -> PortResult<()> {
        let path = format!("/pdfs/{}", encode(document_id));
        Self::send_empty(self.request(Method::DELETE, &path)?).await
    }

    async fn search(&self, query: &str) -> PortResult<Vec<Document>> {
        let path = format!("/pdfs/search?query={}", encode(query));
        Self::send_json::<DocumentListPayload>(self.request(Method::GET, &path)?)
            .await
            .map(DocumentListPayload::to_domain)
    }

    async fn share(&self, document_id: &str) -> PortResult<ShareLink> {
        let path = format!("/pdfs/share/{}", encode(document_id));
        let record = Self::send_json::<ShareRecord>(self.request(Method::POST, &path)?).await?;
        let token = record
            .token
            .as_ref()
            .and_then(link_token)
            .or_else(|| record.shareable_link.as_ref().and_then(link_token))
            .ok_or_else(|| {
                PortError::Unexpected("Share response did not contain a token".to_string())
            })?;
        Ok(ShareLink {
            document_id: document_id.to_string(),
            token,
        })
    }

    async fn get_shared(&self, token: &str) -> PortResult<Document> {
        let path = format!("/pdfs/shared/{}", encode(token));
        Self::send_json::<DocumentPayload>(self.request(Method::GET, &path)?)
            .await
            .and_then(DocumentPayload::to_domain)
    }
}

//=========================================================================================
// `CommentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CommentService for HttpApiClient {
    async fn list(&self, document_id: &str) -> PortResult<Vec<Comment>> {
        let path = format!("/comments/{}", encode(document_id));
        Self::send_json::<CommentListPayload>(self.request(Method::GET, &path)?)
            .await
            .map(CommentListPayload::to_domain)
    }

    async fn create(&self, document_id: &str, content: &str) -> PortResult<Comment> {
        let path = format!("/comments/{}", encode(document_id));
        let request = self
            .request(Method::POST, &path)?
            .json(&ContentBody { content });
        Self::send_json::<CommentPayload>(request)
            .await
            .and_then(CommentPayload::to_domain)
    }

    async fn update(&self, comment_id: &str, content: &str) -> PortResult<Comment> {
        let path = format!("/comments/{}", encode(comment_id));
        let request = self
            .request(Method::PUT, &path)?
            .json(&ContentBody { content });
        Self::send_json::<CommentPayload>(request)
            .await
            .and_then(CommentPayload::to_domain)
    }

    async fn delete(&self, comment_id: &str) -> PortResult<()> {
        let path = format!("/comments/{}", encode(comment_id));
        Self::send_empty(self.request(Method::DELETE, &path)?).await
    }

    async fn reply(&self, comment_id: &str, content: &str) -> PortResult<Comment> {
        let path = format!("/comments/reply/{}", encode(comment_id));
        let request = self
            .request(Method::POST, &path)?
            .json(&ContentBody { content });
        Self::send_json::<CommentPayload>(request)
            .await
            .and_then(CommentPayload::to_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_message_is_kept_on_rejection() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Email already registered"}"#,
        );
        assert_eq!(
            err,
            PortError::Rejected {
                status: 400,
                message: "Email already registered".to_string()
            }
        );
        assert_eq!(err.backend_message(), Some("Email already registered"));
    }

    #[test]
    fn auth_failures_map_to_unauthorized() {
        let bare = status_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(bare, PortError::Unauthorized(String::new()));
        assert_eq!(bare.backend_message(), None);
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, "{}"),
            PortError::Unauthorized(String::new())
        );
    }

    #[test]
    fn unauthorized_keeps_the_backend_message() {
        let err = status_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid email or password for this account"}"#,
        );
        assert!(err.is_unauthorized());
        assert_eq!(
            err.backend_message(),
            Some("Invalid email or password for this account")
        );
        assert_eq!(
            err.to_string(),
            "Unauthorized: Invalid email or password for this account"
        );
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, "Token expired").backend_message(),
            Some("Token expired")
        );
    }

    #[test]
    fn not_found_falls_back_to_reason_phrase() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, ""),
            PortError::NotFound("Not Found".to_string())
        );
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down"),
            PortError::Rejected {
                status: 502,
                message: "upstream down".to_string()
            }
        );
    }

    #[test]
    fn timestamps_in_common_shapes_parse() {
        assert!(parse_timestamp(Some(&json!("2024-03-01T10:00:00.000Z"))).is_some());
        assert!(parse_timestamp(Some(&json!("2024-03-01T10:00:00"))).is_some());
        assert!(parse_timestamp(Some(&json!(1709287200000i64))).is_some());
        assert_eq!(parse_timestamp(Some(&json!("yesterday"))), None);
        assert_eq!(parse_timestamp(None), None);
    }

    #[test]
    fn document_record_tolerates_mongo_ids_and_missing_fields() {
        let record: DocumentRecord = serde_json::from_value(json!({
            "_id": "65f0",
            "originalname": "thesis.pdf",
            "fileUrl": "https://files.example.com/thesis.pdf",
            "ownerId": 12,
            "shareableLink": { "id": "share-1" }
        }))
        .unwrap();
        let document = record.to_domain().unwrap();
        assert_eq!(document.id, "65f0");
        assert_eq!(document.name, "thesis.pdf");
        assert_eq!(document.owner_id, "12");
        assert_eq!(document.size, 0);
        assert_eq!(document.url, "https://files.example.com/thesis.pdf");
        assert_eq!(document.shareable_link.as_deref(), Some("share-1"));
        assert_eq!(document.created_at, None);
    }

    #[test]
    fn non_list_payload_yields_empty_list() {
        let payload: DocumentListPayload =
            serde_json::from_value(json!({ "status": "weird" })).unwrap();
        assert!(payload.to_domain().is_empty());

        let wrapped: DocumentListPayload =
            serde_json::from_value(json!({ "pdfs": [{ "id": "a" }] })).unwrap();
        assert_eq!(wrapped.to_domain().len(), 1);
    }

    #[test]
    fn reply_records_keep_their_parent() {
        let payload: CommentPayload = serde_json::from_value(json!({
            "comment": {
                "id": "c2",
                "content": "agreed",
                "userId": "u1",
                "userName": "Alice",
                "pdfId": "p1",
                "parentId": "c1"
            }
        }))
        .unwrap();
        let comment = payload.to_domain().unwrap();
        assert_eq!(comment.parent_id.as_deref(), Some("c1"));
        assert!(comment.is_reply());

        let top: CommentRecord =
            serde_json::from_value(json!({ "id": "c1", "parentId": null })).unwrap();
        assert_eq!(top.to_domain().unwrap().parent_id, None);
    }

    #[test]
    fn null_fields_do_not_drop_the_list() {
        let payload: DocumentListPayload = serde_json::from_value(json!([
            { "_id": "a", "name": "a.pdf", "url": null, "size": null, "shared": null },
            { "_id": "b", "name": null, "originalname": "b.pdf", "size": "2048" },
        ]))
        .unwrap();
        let documents = payload.to_domain();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].url, "");
        assert_eq!(documents[0].size, 0);
        assert!(!documents[0].shared);
        assert_eq!(documents[1].name, "b.pdf");
        assert_eq!(documents[1].size, 2048);
    }

    #[test]
    fn records_with_both_id_keys_decode() {
        let record: DocumentRecord = serde_json::from_value(json!({
            "_id": "mongo-1",
            "id": "api-1",
            "name": "both.pdf"
        }))
        .unwrap();
        assert_eq!(record.to_domain().unwrap().id, "api-1");

        let comment: CommentRecord = serde_json::from_value(json!({
            "_id": { "$oid": "ignored" },
            "id": "c9",
            "userId": { "_id": "u1", "name": "Alice" }
        }))
        .unwrap();
        let comment = comment.to_domain().unwrap();
        assert_eq!(comment.id, "c9");
        assert_eq!(comment.user_id, "u1");
    }

    #[test]
    fn records_without_an_id_are_skipped_not_fatal() {
        let payload: CommentListPayload = serde_json::from_value(json!({
            "comments": [
                { "id": "c1", "content": "kept" },
                { "content": "no id" },
                "not even an object",
                { "_id": 7, "content": "numeric id" }
            ]
        }))
        .unwrap();
        let comments = payload.to_domain();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, "c1");
        assert_eq!(comments[1].id, "7");
    }
}
