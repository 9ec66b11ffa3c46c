//! services/client/src/views/auth_forms.rs
//!
//! The account forms: sign-in, sign-up, password reset request and password
//! update. Each validates locally before anything is sent.

use pdf_portal_core::domain::{PasswordChange, Registration};
use pdf_portal_core::guard::Route;
use pdf_portal_core::validation::{
    validate_login, validate_password_change, validate_registration, validate_reset_request,
    ValidationErrors,
};
use tracing::error;

use crate::views::state::{AppState, Outcome, ViewScope};

//=========================================================================================
// Sign-in
//=========================================================================================

#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    pub errors: ValidationErrors,
    pub submitting: bool,
    scope: ViewScope,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, app: &AppState) -> Outcome {
        if let Err(errors) = validate_login(&self.email, &self.password) {
            self.errors = errors.clone();
            return Outcome::Invalid(errors);
        }
        self.errors = ValidationErrors::default();

        self.submitting = true;
        let result = self
            .scope
            .run(app.session.login(self.email.trim(), &self.password))
            .await;
        self.submitting = false;

        match result {
            None => Outcome::Cancelled,
            Some(Ok(_)) => {
                app.notifications.success("Welcome back!");
                Outcome::Navigate(Route::Dashboard)
            }
            Some(Err(e)) => {
                error!("Login failed: {}", e);
                app.notifications
                    .error(e.backend_message().unwrap_or("Invalid email or password"));
                Outcome::Failed
            }
        }
    }
}

//=========================================================================================
// Sign-up
//=========================================================================================

#[derive(Debug, Default)]
pub struct SignupView {
    pub name: String,
    pub email: String,
    pub password: String,
    pub errors: ValidationErrors,
    pub submitting: bool,
    scope: ViewScope,
}

impl SignupView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, app: &AppState) -> Outcome {
        let registration = Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        if let Err(errors) = validate_registration(&registration) {
            self.errors = errors.clone();
            return Outcome::Invalid(errors);
        }
        self.errors = ValidationErrors::default();

        self.submitting = true;
        let result = self.scope.run(app.session.signup(&registration)).await;
        self.submitting = false;

        match result {
            None => Outcome::Cancelled,
            Some(Ok(_)) => {
                app.notifications.success("Account created successfully!");
                Outcome::Navigate(Route::Dashboard)
            }
            Some(Err(e)) => {
                error!("Signup failed: {}", e);
                app.notifications
                    .error(e.backend_message().unwrap_or("Failed to create account"));
                Outcome::Failed
            }
        }
    }
}

//=========================================================================================
// Password reset request
//=========================================================================================

#[derive(Debug, Default)]
pub struct ResetPasswordView {
    pub email: String,
    pub errors: ValidationErrors,
    /// Set once the backend accepted the request.
    pub submitted: bool,
    scope: ViewScope,
}

impl ResetPasswordView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, app: &AppState) -> Outcome {
        if let Err(errors) = validate_reset_request(&self.email) {
            self.errors = errors.clone();
            return Outcome::Invalid(errors);
        }
        self.errors = ValidationErrors::default();

        match self.scope.run(app.auth.reset_password(self.email.trim())).await {
            None => Outcome::Cancelled,
            Some(Ok(())) => {
                self.submitted = true;
                app.notifications
                    .success("Password reset instructions sent to your email");
                Outcome::Done
            }
            Some(Err(e)) => {
                error!("Password reset request failed: {}", e);
                app.notifications.error("Failed to send reset instructions");
                Outcome::Failed
            }
        }
    }
}

//=========================================================================================
// Password update
//=========================================================================================

#[derive(Debug, Default)]
pub struct UpdatePasswordView {
    pub user_id: String,
    pub old_password: String,
    pub new_password: String,
    pub errors: ValidationErrors,
    scope: ViewScope,
}

impl UpdatePasswordView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, app: &AppState) -> Outcome {
        let user_id = self.user_id.trim();
        let change = PasswordChange {
            user_id: (!user_id.is_empty()).then(|| user_id.to_string()),
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
        };
        if let Err(errors) = validate_password_change(&change) {
            self.errors = errors.clone();
            return Outcome::Invalid(errors);
        }
        self.errors = ValidationErrors::default();

        let Some(result) = self.scope.run(app.auth.update_password(&change)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(()) => {
                app.notifications.success("Password updated successfully!");
                Outcome::Navigate(Route::Dashboard)
            }
            Err(e) => {
                error!("Password update failed: {}", e);
                app.notifications
                    .error(e.backend_message().unwrap_or("Failed to update password"));
                app.failure(&e)
            }
        }
    }
}
