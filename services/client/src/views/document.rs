//! services/client/src/views/document.rs
//!
//! The per-document viewer: the document itself, its comment threads, and
//! the share action.

use std::collections::{HashMap, HashSet};

use pdf_portal_core::domain::{Comment, Document};
use pdf_portal_core::guard::Route;
use pdf_portal_core::validation::comment_content;
use tracing::{error, info};

use crate::views::state::{AppState, Outcome, ViewScope};

/// A top-level comment and every reply below it, in backend order.
#[derive(Debug, PartialEq, Eq)]
pub struct CommentThread<'a> {
    pub comment: &'a Comment,
    pub replies: Vec<&'a Comment>,
}

#[derive(Debug)]
pub struct DocumentView {
    pub document_id: String,
    /// The comment being composed.
    pub draft: String,
    document: Option<Document>,
    comments: Vec<Comment>,
    share_url: Option<String>,
    loading: bool,
    scope: ViewScope,
}

impl DocumentView {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            draft: String::new(),
            document: None,
            comments: Vec::new(),
            share_url: None,
            loading: true,
            scope: ViewScope::new(),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn share_url(&self) -> Option<&str> {
        self.share_url.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Fetches the document and its comments concurrently. If either fails
    /// the viewer sends the user back to the dashboard.
    pub async fn load(&mut self, app: &AppState) -> Outcome {
        let was_loading = std::mem::replace(&mut self.loading, true);
        let id = self.document_id.as_str();
        let fetch = async {
            futures::try_join!(app.documents.get(id), app.comments.list(id))
        };
        let Some(result) = self.scope.run(fetch).await else {
            self.loading = was_loading;
            return Outcome::Cancelled;
        };
        self.loading = false;

        match app.checked(result) {
            Ok((document, comments)) => {
                self.document = Some(document);
                self.comments = comments;
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to load document {}: {}", self.document_id, e);
                app.notifications.error("Failed to load PDF");
                match app.failure(&e) {
                    Outcome::Failed => Outcome::Navigate(Route::Dashboard),
                    other => other,
                }
            }
        }
    }

    /// Mints a share link and keeps its public URL on the view.
    pub async fn share(&mut self, app: &AppState) -> Outcome {
        let Some(result) = self.scope.run(app.documents.share(&self.document_id)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(link) => {
                let url = link.public_url(&app.config.app_origin);
                info!(document_id = %self.document_id, "Share link created.");
                self.share_url = Some(url);
                app.notifications.success("Share link created!");
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to share document {}: {}", self.document_id, e);
                app.notifications.error("Failed to generate share link");
                app.failure(&e)
            }
        }
    }

    /// Posts the draft as a new comment. A blank draft is ignored.
    pub async fn add_comment(&mut self, app: &AppState) -> Outcome {
        let Some(content) = comment_content(&self.draft).map(str::to_string) else {
            return Outcome::Done;
        };
        let Some(result) = self
            .scope
            .run(app.comments.create(&self.document_id, &content))
            .await
        else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(comment) => {
                self.comments.insert(0, comment);
                self.draft.clear();
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to add comment: {}", e);
                app.notifications.error("Failed to add comment");
                app.failure(&e)
            }
        }
    }

    /// Replaces a comment's content in place. Blank content is ignored.
    pub async fn edit_comment(&mut self, app: &AppState, comment_id: &str, content: &str) -> Outcome {
        let Some(content) = comment_content(content) else {
            return Outcome::Done;
        };
        let Some(result) = self.scope.run(app.comments.update(comment_id, content)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(updated) => {
                if let Some(slot) = self.comments.iter_mut().find(|c| c.id == comment_id) {
                    let parent_id = slot.parent_id.take();
                    *slot = updated;
                    if slot.parent_id.is_none() {
                        slot.parent_id = parent_id;
                    }
                }
                app.notifications.success("Comment updated");
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to update comment {}: {}", comment_id, e);
                app.notifications.error("Failed to update comment");
                app.failure(&e)
            }
        }
    }

    /// Deletes a comment; its replies go with it.
    pub async fn delete_comment(&mut self, app: &AppState, comment_id: &str) -> Outcome {
        let Some(result) = self.scope.run(app.comments.delete(comment_id)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(()) => {
                let removed = descendants(&self.comments, comment_id);
                self.comments.retain(|c| !removed.contains(&c.id));
                app.notifications.success("Comment deleted");
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to delete comment {}: {}", comment_id, e);
                app.notifications.error("Failed to delete comment");
                app.failure(&e)
            }
        }
    }

    /// Replies to a comment. Blank content is ignored.
    pub async fn reply(&mut self, app: &AppState, parent_id: &str, content: &str) -> Outcome {
        let Some(content) = comment_content(content) else {
            return Outcome::Done;
        };
        let Some(result) = self.scope.run(app.comments.reply(parent_id, content)).await else {
            return Outcome::Cancelled;
        };
        match app.checked(result) {
            Ok(mut reply) => {
                if reply.parent_id.is_none() {
                    reply.parent_id = Some(parent_id.to_string());
                }
                self.comments.push(reply);
                Outcome::Done
            }
            Err(e) => {
                error!("Failed to reply to comment {}: {}", parent_id, e);
                app.notifications.error("Failed to add reply");
                app.failure(&e)
            }
        }
    }

    /// Groups the comments into threads. Replies to replies join the thread of
    /// their root; replies whose parent is not loaded are shown as top-level.
    pub fn threads(&self) -> Vec<CommentThread<'_>> {
        let by_id: HashMap<&str, &Comment> =
            self.comments.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut threads: Vec<CommentThread<'_>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut pending: Vec<(&str, &Comment)> = Vec::new();

        for comment in &self.comments {
            match root_id(comment, &by_id) {
                Some(root) => pending.push((root, comment)),
                None => {
                    index.insert(comment.id.as_str(), threads.len());
                    threads.push(CommentThread {
                        comment,
                        replies: Vec::new(),
                    });
                }
            }
        }
        for (root, reply) in pending {
            if let Some(&i) = index.get(root) {
                threads[i].replies.push(reply);
            }
        }
        threads
    }
}

/// Walks up the parent chain to the top-level comment. `None` when the
/// comment is itself top-level or its parent is not loaded.
fn root_id<'a>(comment: &'a Comment, by_id: &HashMap<&str, &'a Comment>) -> Option<&'a str> {
    let mut current = comment;
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(parent) = current
        .parent_id
        .as_deref()
        .and_then(|p| by_id.get(p).copied())
    {
        if !seen.insert(current.id.as_str()) {
            break;
        }
        current = parent;
    }
    (current.id != comment.id).then_some(current.id.as_str())
}

/// The comment and every comment below it.
fn descendants(comments: &[Comment], comment_id: &str) -> HashSet<String> {
    let mut removed: HashSet<String> = HashSet::from([comment_id.to_string()]);
    loop {
        let before = removed.len();
        for comment in comments {
            if let Some(parent) = comment.parent_id.as_deref() {
                if removed.contains(parent) {
                    removed.insert(comment.id.clone());
                }
            }
        }
        if removed.len() == before {
            return removed;
        }
    }
}
