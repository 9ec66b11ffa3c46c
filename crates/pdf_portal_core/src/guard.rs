//! crates/pdf_portal_core/src/guard.rs
//!
//! The route table and the guard that gates authenticated views.

use std::fmt;

use crate::session::SessionState;

/// Every view the client can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    ResetPassword,
    Shared { token: String },
    Root,
    Dashboard,
    Document { id: String },
    UpdatePassword,
}

impl Route {
    /// Parses a path such as `/pdf/42`. Trailing slashes are ignored and
    /// path parameters are percent-decoded. Returns `None` for unknown paths.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["reset-password"] => Route::ResetPassword,
            ["update-password"] => Route::UpdatePassword,
            ["dashboard"] => Route::Dashboard,
            ["pdf", id] => Route::Document { id: decode(id)? },
            ["pdfs", "shared", token] => Route::Shared {
                token: decode(token)?,
            },
            _ => return None,
        };
        Some(route)
    }

    /// Public views are reachable regardless of session state.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Signup | Route::ResetPassword | Route::Shared { .. }
        )
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
            Route::UpdatePassword => "/update-password".to_string(),
            Route::Root => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Document { id } => format!("/pdf/{}", urlencoding::encode(id)),
            Route::Shared { token } => format!("/pdfs/shared/{}", urlencoding::encode(token)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

/// The outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Navigate elsewhere, replacing the current history entry.
    Redirect(Route),
    NotFound,
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn resolve(route: Route, state: &SessionState) -> Navigation {
        if route.is_public() {
            return Navigation::Render(route);
        }
        if !state.is_authenticated() {
            return Navigation::Redirect(Route::Login);
        }
        match route {
            Route::Root => Navigation::Redirect(Route::Dashboard),
            route => Navigation::Render(route),
        }
    }

    pub fn resolve_path(path: &str, state: &SessionState) -> Navigation {
        match Route::parse(path) {
            Some(route) => Self::resolve(route, state),
            None => Navigation::NotFound,
        }
    }
}
