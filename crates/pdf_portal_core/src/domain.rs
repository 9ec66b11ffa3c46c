//! crates/pdf_portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any wire or storage format.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Represents an account known to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// `None` when the backend sent no date or one that does not parse.
    pub created_at: Option<DateTime<Utc>>,
}

/// The client's record of the authenticated identity and its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Represents a PDF document stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub owner_id: String,
    pub shared: bool,
    pub url: String,
    pub uploaded_by: Option<String>,
    pub shareable_link: Option<String>,
}

/// A single comment on a document. Replies carry the id of their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub user_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub pdf_id: String,
    pub parent_id: Option<String>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A backend-minted token granting read-only access to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub document_id: String,
    pub token: String,
}

impl ShareLink {
    /// The public URL of the shared-document view for this link.
    pub fn public_url(&self, app_origin: &str) -> String {
        format!(
            "{}/pdfs/shared/{}",
            app_origin.trim_end_matches('/'),
            urlencoding::encode(&self.token)
        )
    }
}

/// A local file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Only `.pdf` files are accepted, matched case-insensitively.
    pub fn is_pdf(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// Credentials and profile data sent to the register endpoint.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload for the update-password endpoint.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub user_id: Option<String>,
    pub old_password: String,
    pub new_password: String,
}
