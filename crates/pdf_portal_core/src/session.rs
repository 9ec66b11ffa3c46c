//! crates/pdf_portal_core/src/session.rs
//!
//! The session store: the single authority on who is logged in.
//!
//! The store is created once at startup, restored from persisted storage, and
//! handed to every view as an `Arc<SessionStore>`. The persisted copy is only a
//! cache; whatever the backend accepts is the source of truth, so an
//! authorization failure from any endpoint ends the session.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::{Registration, Session, User};
use crate::ports::{AuthService, PortResult, SessionStorage};

/// The lifecycle states of the client session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Creates an anonymous store. Call [`SessionStore::restore`] to pick up a
    /// persisted session.
    pub fn new(auth: Arc<dyn AuthService>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            auth,
            storage,
            state: RwLock::new(SessionState::Anonymous),
        }
    }

    /// Reads the persisted token and user. When both are present the store
    /// enters `Authenticated` without contacting the backend. A partial or
    /// unreadable cache is cleared.
    pub fn restore(&self) -> SessionState {
        let restored = match (self.storage.token(), self.storage.user()) {
            (Ok(Some(token)), Ok(Some(user))) => Some(Session { token, user }),
            (Ok(None), Ok(None)) => None,
            (token, user) => {
                warn!(
                    token_present = matches!(token, Ok(Some(_))),
                    user_error = ?user.err(),
                    "Discarding incomplete persisted session."
                );
                if let Err(e) = self.storage.clear() {
                    warn!("Failed to clear persisted session: {}", e);
                }
                None
            }
        };

        let next = match restored {
            Some(session) => {
                info!(user_id = %session.user.id, "Restored persisted session.");
                SessionState::Authenticated(session)
            }
            None => SessionState::Anonymous,
        };
        *self.state.write() = next.clone();
        next
    }

    /// Logs in against the backend. On failure nothing is persisted and the
    /// state is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let session = self.auth.login(email, password).await?;
        self.establish(session)
    }

    /// Creates an account and starts a session for it.
    pub async fn signup(&self, registration: &Registration) -> PortResult<User> {
        let session = self.auth.register(registration).await?;
        self.establish(session)
    }

    /// Ends the session. The backend call is best effort; the local session
    /// is cleared whatever it answers.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            warn!("Backend logout failed, clearing local session anyway: {}", e);
        }
        self.invalidate();
    }

    /// Drops the session locally without contacting the backend.
    pub fn invalidate(&self) {
        let mut state = self.state.write();
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        let previous = std::mem::take(&mut *state);
        drop(state);
        if let SessionState::Authenticated(session) = previous {
            info!(user_id = %session.user.id, "Session ended.");
        }
    }

    /// Passes an operation result through, ending the session when the
    /// backend no longer accepts the token.
    pub fn check<T>(&self, result: PortResult<T>) -> PortResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                warn!("Backend rejected the session token; logging out.");
                self.invalidate();
            }
        }
        result
    }

    /// Re-validates the session against the backend and refreshes the cached
    /// user. The user is only persisted if the session is still open when the
    /// answer arrives.
    pub async fn refresh(&self) -> PortResult<User> {
        let user = self.check(self.auth.current_user().await)?;
        // Storage writes happen under the state lock so they order with `invalidate`.
        let mut state = self.state.write();
        match &mut *state {
            SessionState::Authenticated(session) => {
                self.storage.store_user(&user)?;
                session.user = user.clone();
            }
            SessionState::Anonymous => {
                info!("Session ended while refreshing; cached user left cleared.");
            }
        }
        Ok(user)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read().session().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().session().map(|s| s.token.clone())
    }

    fn establish(&self, session: Session) -> PortResult<User> {
        let mut state = self.state.write();
        self.storage.store(&session)?;
        info!(user_id = %session.user.id, "Session established.");
        let user = session.user.clone();
        *state = SessionState::Authenticated(session);
        Ok(user)
    }
}
