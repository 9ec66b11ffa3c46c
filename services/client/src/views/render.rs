//! services/client/src/views/render.rs
//!
//! Plain-text rendering of view state for the terminal front end.

use chrono::{DateTime, Datelike, Utc};
use pdf_portal_core::domain::{Comment, Document, User};

use crate::views::dashboard::DashboardDisplay;
use crate::views::document::CommentThread;
use crate::views::notify::{Toast, ToastLevel};
use crate::views::shared::SharedDisplay;

/// Long date with an ordinal day, e.g. `March 1st, 2024`.
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    let Some(date) = date else {
        return "Unknown date".to_string();
    };
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (1, d) if d != 11 => "st",
        (2, d) if d != 12 => "nd",
        (3, d) if d != 13 => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

pub fn document_line(document: &Document) -> String {
    let mut line = format!(
        "{}  {}  ({} · {})",
        document.id,
        document.name,
        format_date(document.created_at.as_ref()),
        format_size(document.size)
    );
    if document.shared {
        line.push_str("  [Shared]");
    }
    line
}

pub fn dashboard(display: DashboardDisplay<'_>) -> String {
    match display {
        DashboardDisplay::Loading => "Loading...".to_string(),
        DashboardDisplay::Empty => {
            "No PDFs yet. Get started by uploading a PDF file.".to_string()
        }
        DashboardDisplay::List(documents) => documents
            .iter()
            .map(document_line)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn document_details(document: &Document) -> String {
    let mut out = format!(
        "{}\n  uploaded {} · {}\n  {}",
        document.name,
        format_date(document.created_at.as_ref()),
        format_size(document.size),
        document.url
    );
    if document.shared {
        out.push_str("\n  shared");
    }
    out
}

fn comment_line(comment: &Comment, indent: &str) -> String {
    format!(
        "{}[{}] {} ({}): {}",
        indent,
        comment.id,
        comment.user_name,
        format_date(comment.created_at.as_ref()),
        comment.content
    )
}

pub fn threads(threads: &[CommentThread<'_>]) -> String {
    if threads.is_empty() {
        return "No comments yet.".to_string();
    }
    let mut lines = Vec::new();
    for thread in threads {
        lines.push(comment_line(thread.comment, ""));
        for reply in &thread.replies {
            lines.push(comment_line(reply, "    ↳ "));
        }
    }
    lines.join("\n")
}

pub fn shared(display: &SharedDisplay) -> String {
    match display {
        SharedDisplay::Loading => "Loading...".to_string(),
        SharedDisplay::Found(document) => document_details(document),
        SharedDisplay::NotFound => {
            "PDF not found. This share link may have expired or been removed.".to_string()
        }
    }
}

pub fn user(user: &User) -> String {
    format!("{} <{}> (id {})", user.name, user.email, user.id)
}

pub fn toast(toast: &Toast) -> String {
    match toast.level {
        ToastLevel::Success => format!("✔ {}", toast.message),
        ToastLevel::Error => format!("✖ {}", toast.message),
    }
}
