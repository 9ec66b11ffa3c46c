//! crates/pdf_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP backend and of where the session is persisted.

use async_trait::async_trait;

use crate::domain::{
    Comment, Document, PasswordChange, Registration, Session, ShareLink, UploadFile, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, filesystem).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The backend refused the credentials or the token (401/403). Holds the
    /// backend's message, empty when it sent none.
    #[error("Unauthorized{}", message_suffix(.0))]
    Unauthorized(String),
    /// The backend answered with a non-success status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message the backend attached to its error payload, when there was one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            PortError::Rejected { message, .. }
            | PortError::NotFound(message)
            | PortError::Unauthorized(message)
                if !message.is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Unauthorized(_))
    }
}

fn message_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, registration: &Registration) -> PortResult<Session>;

    async fn login(&self, email: &str, password: &str) -> PortResult<Session>;

    async fn logout(&self) -> PortResult<()>;

    /// Requests a password-reset email. Does not require a session.
    async fn reset_password(&self, email: &str) -> PortResult<()>;

    async fn update_password(&self, change: &PasswordChange) -> PortResult<()>;

    async fn current_user(&self) -> PortResult<User>;
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> PortResult<Document>;

    async fn list(&self) -> PortResult<Vec<Document>>;

    async fn get(&self, document_id: &str) -> PortResult<Document>;

    async fn delete(&self, document_id: &str) -> PortResult<()>;

    /// Free-text search. The query is percent-encoded by the implementation.
    async fn search(&self, query: &str) -> PortResult<Vec<Document>>;

    async fn share(&self, document_id: &str) -> PortResult<ShareLink>;

    /// Retrieves a document through its share token. Does not require a session.
    async fn get_shared(&self, token: &str) -> PortResult<Document>;
}

#[async_trait]
pub trait CommentService: Send + Sync {
    async fn list(&self, document_id: &str) -> PortResult<Vec<Comment>>;

    async fn create(&self, document_id: &str, content: &str) -> PortResult<Comment>;

    async fn update(&self, comment_id: &str, content: &str) -> PortResult<Comment>;

    async fn delete(&self, comment_id: &str) -> PortResult<()>;

    async fn reply(&self, comment_id: &str, content: &str) -> PortResult<Comment>;
}

/// The persisted token/user cache. Read at startup and on every outgoing request.
pub trait SessionStorage: Send + Sync {
    fn token(&self) -> PortResult<Option<String>>;

    fn user(&self) -> PortResult<Option<User>>;

    fn store(&self, session: &Session) -> PortResult<()>;

    fn store_user(&self, user: &User) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
