//! services/client/src/views/state.rs
//!
//! Defines the application's shared state and the per-view cancellation scope.

use std::future::Future;
use std::sync::Arc;

use pdf_portal_core::guard::Route;
use pdf_portal_core::ports::{
    AuthService, CommentService, DocumentService, PortError, PortResult, SessionStorage,
};
use pdf_portal_core::session::SessionStore;
use pdf_portal_core::validation::ValidationErrors;
use tokio_util::sync::CancellationToken;

use crate::adapters::{FileSessionStorage, HttpApiClient};
use crate::config::Config;
use crate::error::ClientError;
use crate::views::notify::Notifications;

//=========================================================================================
// AppState (Shared Across All Views)
//=========================================================================================

/// The shared application state, created once at startup and passed to all views.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub auth: Arc<dyn AuthService>,
    pub documents: Arc<dyn DocumentService>,
    pub comments: Arc<dyn CommentService>,
    pub notifications: Notifications,
}

impl AppState {
    /// Wires the HTTP adapter and the session store over `storage`, then
    /// restores any persisted session.
    pub fn new(config: Arc<Config>, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let api = Arc::new(HttpApiClient::new(&config, storage.clone())?);
        let session = Arc::new(SessionStore::new(api.clone(), storage));
        session.restore();

        Ok(Self {
            config,
            session,
            auth: api.clone(),
            documents: api.clone(),
            comments: api,
            notifications: Notifications::default(),
        })
    }

    /// Builds the state with the session persisted at `config.session_file`.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
        Self::new(Arc::new(config), storage)
    }

    /// Passes the result of an authenticated call through the session store,
    /// which logs out on an authorization failure.
    pub fn checked<T>(&self, result: PortResult<T>) -> PortResult<T> {
        self.session.check(result)
    }

    /// The outcome for a failed authenticated action: back to sign-in when the
    /// session was rejected, otherwise stay put.
    pub fn failure(&self, error: &PortError) -> Outcome {
        if error.is_unauthorized() {
            Outcome::Navigate(Route::Login)
        } else {
            Outcome::Failed
        }
    }
}

//=========================================================================================
// Action Outcomes
//=========================================================================================

/// What a view action asks of the shell once it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Navigate(Route),
    /// The form was not sent; field errors are on the view.
    Invalid(ValidationErrors),
    /// The call failed and an error notification was published.
    Failed,
    /// The view was torn down before the call finished.
    Cancelled,
}

//=========================================================================================
// ViewScope (Specific to One View)
//=========================================================================================

/// Ties a view's in-flight requests to the view's lifetime. Dropping the scope
/// or calling [`ViewScope::teardown`] cancels them.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `future` unless the view is torn down first, in which case `None`
    /// is returned and the future is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A handle that tears the view down from another task.
    pub fn canceller(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
