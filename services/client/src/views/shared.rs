//! services/client/src/views/shared.rs
//!
//! The public shared-document viewer. Reachable without a session; it never
//! touches the session store and never redirects.

use pdf_portal_core::domain::Document;
use tracing::{error, info};

use crate::views::state::{AppState, Outcome, ViewScope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedDisplay {
    Loading,
    Found(Document),
    /// The link is invalid, expired or was removed.
    NotFound,
}

#[derive(Debug)]
pub struct SharedDocumentView {
    pub token: String,
    display: SharedDisplay,
    scope: ViewScope,
}

impl SharedDocumentView {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            display: SharedDisplay::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn display(&self) -> &SharedDisplay {
        &self.display
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn load(&mut self, app: &AppState) -> Outcome {
        let Some(result) = self.scope.run(app.documents.get_shared(&self.token)).await else {
            return Outcome::Cancelled;
        };
        match result {
            Ok(document) => {
                info!(document_id = %document.id, "Opened shared document.");
                self.display = SharedDisplay::Found(document);
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to open shared document: {}", e);
                self.display = SharedDisplay::NotFound;
                app.notifications.error("Invalid or expired share link");
                Outcome::Failed
            }
        }
    }
}
