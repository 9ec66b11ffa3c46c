//! services/client/src/views/dashboard.rs
//!
//! The dashboard: the signed-in user's document list with search, upload and
//! delete. The list is a local copy; it is replaced wholesale on load and
//! search, and patched only after the backend confirms an upload or delete.

use pdf_portal_core::domain::{Document, UploadFile};
use pdf_portal_core::guard::Route;
use pdf_portal_core::validation::validate_upload;
use tracing::{error, info};

use crate::views::state::{AppState, Outcome, ViewScope};

/// What the dashboard shows right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardDisplay<'a> {
    Loading,
    /// No documents: an empty-state prompt to upload, not an error.
    Empty,
    List(&'a [Document]),
}

#[derive(Debug)]
pub struct DashboardView {
    pub search: String,
    documents: Vec<Document>,
    loading: bool,
    scope: ViewScope,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            search: String::new(),
            documents: Vec::new(),
            loading: true,
            scope: ViewScope::new(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn display(&self) -> DashboardDisplay<'_> {
        if self.loading {
            DashboardDisplay::Loading
        } else if self.documents.is_empty() {
            DashboardDisplay::Empty
        } else {
            DashboardDisplay::List(&self.documents)
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Fetches the full document list.
    pub async fn load(&mut self, app: &AppState) -> Outcome {
        let was_loading = std::mem::replace(&mut self.loading, true);
        let Some(result) = self.scope.run(app.documents.list()).await else {
            self.loading = was_loading;
            return Outcome::Cancelled;
        };
        self.loading = false;

        match app.checked(result) {
            Ok(documents) => {
                self.documents = documents;
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to fetch documents: {}", e);
                app.notifications.error("Failed to fetch PDFs");
                app.failure(&e)
            }
        }
    }

    /// Replaces the list with the results for the current search text. An
    /// empty search shows every document again.
    pub async fn run_search(&mut self, app: &AppState) -> Outcome {
        let query = self.search.trim().to_string();
        if query.is_empty() {
            return self.load(app).await;
        }

        let was_loading = std::mem::replace(&mut self.loading, true);
        let Some(result) = self.scope.run(app.documents.search(&query)).await else {
            self.loading = was_loading;
            return Outcome::Cancelled;
        };
        self.loading = false;

        match app.checked(result) {
            Ok(documents) => {
                info!(%query, hits = documents.len(), "Search finished.");
                self.documents = documents;
                Outcome::Done
            }
            Err(e) => {
                error!("Search failed: {}", e);
                app.notifications.error("Failed to search PDFs");
                app.failure(&e)
            }
        }
    }

    /// Uploads a PDF and puts the record returned by the backend at the top
    /// of the list.
    pub async fn upload(&mut self, app: &AppState, file: UploadFile) -> Outcome {
        if let Err(errors) = validate_upload(&file) {
            app.notifications.error("Only PDF files are accepted");
            return Outcome::Invalid(errors);
        }

        let Some(result) = self.scope.run(app.documents.upload(&file)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(document) => {
                info!(document_id = %document.id, "Document uploaded.");
                self.documents.insert(0, document);
                app.notifications.success("PDF uploaded successfully!");
                Outcome::Done
            }
            Err(e) => {
                error!("Upload of {} failed: {}", file.file_name, e);
                app.notifications.error("Failed to upload PDF");
                app.failure(&e)
            }
        }
    }

    /// Deletes a document and removes exactly that id from the list.
    pub async fn delete(&mut self, app: &AppState, document_id: &str) -> Outcome {
        let Some(result) = self.scope.run(app.documents.delete(document_id)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(()) => {
                self.documents.retain(|d| d.id != document_id);
                app.notifications.success("PDF deleted successfully!");
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to delete document {}: {}", document_id, e);
                app.notifications.error("Failed to delete PDF");
                app.failure(&e)
            }
        }
    }

    /// Ends the session and returns to sign-in. Always succeeds locally.
    pub async fn logout(&mut self, app: &AppState) -> Outcome {
        app.session.logout().await;
        self.scope.teardown();
        Outcome::Navigate(Route::Login)
    }
}
