//! crates/pdf_portal_core/src/validation.rs
//!
//! Field-level form validation, run before any network call so errors can be
//! reported next to the offending field.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{PasswordChange, Registration, UploadFile};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field error found on a form, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// The message for one field, if that field failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !EMAIL.is_match(email) {
        errors.push("email", "Invalid email address");
    }
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    check_required(&mut errors, "password", password, "Password is required");
    errors.into_result()
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_required(&mut errors, "name", &registration.name, "Name is required");
    check_email(&mut errors, &registration.email);
    if registration.password.is_empty() {
        errors.push("password", "Password is required");
    } else if registration.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    errors.into_result()
}

pub fn validate_reset_request(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    errors.into_result()
}

pub fn validate_password_change(change: &PasswordChange) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_required(
        &mut errors,
        "oldPassword",
        &change.old_password,
        "Old Password is required",
    );
    check_required(
        &mut errors,
        "newPassword",
        &change.new_password,
        "New Password is required",
    );
    errors.into_result()
}

pub fn validate_upload(file: &UploadFile) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !file.is_pdf() {
        errors.push("file", "Only PDF files are accepted");
    }
    errors.into_result()
}

/// Returns the trimmed comment text, or `None` when there is nothing to post.
pub fn comment_content(draft: &str) -> Option<&str> {
    let trimmed = draft.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let errors = validate_login("", "").unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert!(validate_login("demo@example.com", "password").is_ok());
    }

    #[test]
    fn email_shape_needs_one_at_and_a_dotted_domain() {
        for good in ["a@b.io", "first.last+tag@mail.example.org"] {
            assert!(EMAIL.is_match(good), "{}", good);
        }
        for bad in ["a@b", "a b@c.io", "a@@b.io", "@b.io", "a@b."] {
            assert!(!EMAIL.is_match(bad), "{}", bad);
        }
    }

    #[test]
    fn malformed_email_is_reported_inline() {
        let errors = validate_login("not-an-email", "pw").unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("password"), None);
    }

    #[test]
    fn registration_enforces_password_length() {
        let registration = Registration {
            name: "  ".to_string(),
            email: "a@b.io".to_string(),
            password: "12345".to_string(),
        };
        let errors = validate_registration(&registration).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.to_string(), "name: Name is required; password: Password must be at least 6 characters");
    }

    #[test]
    fn password_change_needs_old_and_new() {
        let change = PasswordChange {
            user_id: None,
            old_password: String::new(),
            new_password: "next".to_string(),
        };
        let errors = validate_password_change(&change).unwrap_err();
        assert_eq!(errors.get("oldPassword"), Some("Old Password is required"));
        assert_eq!(errors.get("newPassword"), None);
    }

    #[test]
    fn only_pdfs_can_be_uploaded() {
        assert!(validate_upload(&UploadFile::new("scan.pdf", vec![1u8])).is_ok());
        let errors = validate_upload(&UploadFile::new("scan.png", vec![1u8])).unwrap_err();
        assert_eq!(errors.get("file"), Some("Only PDF files are accepted"));
    }

    #[test]
    fn blank_comments_are_ignored() {
        assert_eq!(comment_content("   \n"), None);
        assert_eq!(comment_content("  nice doc "), Some("nice doc"));
    }
}
