//! services/client/src/views/shell.rs
//!
//! The application shell: resolves a path through the route guard and builds
//! the view for wherever the navigation lands.

use pdf_portal_core::guard::{Navigation, Route, RouteGuard};
use tracing::debug;

use crate::views::auth_forms::{LoginView, ResetPasswordView, SignupView, UpdatePasswordView};
use crate::views::dashboard::DashboardView;
use crate::views::document::DocumentView;
use crate::views::shared::SharedDocumentView;
use crate::views::state::AppState;

// Redirects always end on a public route, so this is never reached in practice.
const MAX_REDIRECTS: usize = 4;

/// The view currently on screen.
#[derive(Debug)]
pub enum Screen {
    Login(LoginView),
    Signup(SignupView),
    ResetPassword(ResetPasswordView),
    UpdatePassword(UpdatePasswordView),
    Dashboard(DashboardView),
    Document(DocumentView),
    Shared(SharedDocumentView),
    NotFound,
}

impl Screen {
    fn for_route(route: &Route) -> Screen {
        match route {
            Route::Login => Screen::Login(LoginView::new()),
            Route::Signup => Screen::Signup(SignupView::new()),
            Route::ResetPassword => Screen::ResetPassword(ResetPasswordView::new()),
            Route::UpdatePassword => Screen::UpdatePassword(UpdatePasswordView::new()),
            Route::Root | Route::Dashboard => Screen::Dashboard(DashboardView::new()),
            Route::Document { id } => Screen::Document(DocumentView::new(id.clone())),
            Route::Shared { token } => Screen::Shared(SharedDocumentView::new(token.clone())),
        }
    }
}

/// Where a navigation ended up and what to show there.
#[derive(Debug)]
pub struct Landing {
    /// The route being rendered; `None` for an unknown path.
    pub route: Option<Route>,
    pub redirected: bool,
    pub screen: Screen,
}

pub struct Shell {
    app: AppState,
}

impl Shell {
    pub fn new(app: AppState) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    /// Navigates to `path`, following guard redirects.
    pub fn navigate(&self, path: &str) -> Landing {
        match Route::parse(path) {
            Some(route) => self.open(route),
            None => {
                debug!(path, "No route matches.");
                Landing {
                    route: None,
                    redirected: false,
                    screen: Screen::NotFound,
                }
            }
        }
    }

    pub fn open(&self, route: Route) -> Landing {
        let mut current = route;
        let mut redirected = false;
        for _ in 0..MAX_REDIRECTS {
            match RouteGuard::resolve(current.clone(), &self.app.session.state()) {
                Navigation::Render(route) => {
                    return Landing {
                        screen: Screen::for_route(&route),
                        route: Some(route),
                        redirected,
                    }
                }
                Navigation::Redirect(next) => {
                    debug!(from = %current, to = %next, "Redirecting.");
                    current = next;
                    redirected = true;
                }
                Navigation::NotFound => break,
            }
        }
        Landing {
            route: None,
            redirected,
            screen: Screen::NotFound,
        }
    }
}
