//! Comment write actions.

use std::sync::Arc;

use crate::cell::{StateCell, StateWatch};
use crate::error::{ErrorSet, TransportError};
use crate::model::{Comment, CommentThread};
use crate::mutation::{run_guarded, SubmissionGuard};
use crate::overlay::{CommentsPatch, Overlay};
use crate::transport::Transport;

/// The comment box plus per-comment deletion on one article page.
pub struct CommentActions {
    transport: Arc<dyn Transport>,
    add_guard: SubmissionGuard,
    delete_guard: SubmissionGuard,
    errors: StateCell<Option<ErrorSet>>,
}

impl CommentActions {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            add_guard: SubmissionGuard::new(),
            delete_guard: SubmissionGuard::new(),
            errors: StateCell::new(None),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.add_guard.is_submitting()
    }

    pub fn submitting_watch(&self) -> StateWatch<bool> {
        self.add_guard.watch()
    }

    pub fn errors(&self) -> Option<ErrorSet> {
        self.errors.get()
    }

    pub fn errors_watch(&self) -> StateWatch<Option<ErrorSet>> {
        self.errors.watch()
    }

    /// Success prepends the new comment onto the focused thread and hands
    /// it back so the caller can clear its input.
    pub async fn add(
        &self,
        overlay: &Overlay<CommentThread>,
        body: &str,
    ) -> Option<Result<Comment, TransportError>> {
        run_guarded(&self.add_guard, Some(&self.errors), async {
            let slug = overlay.key().to_string();
            let comment = self.transport.add_comment(&slug, body).await?;
            overlay.apply_patch(&slug, CommentsPatch::Added(comment.clone()));
            Ok(comment)
        })
        .await
    }

    pub async fn delete(
        &self,
        overlay: &Overlay<CommentThread>,
        id: &str,
    ) -> Option<Result<(), TransportError>> {
        run_guarded(&self.delete_guard, None, async {
            let slug = overlay.key().to_string();
            self.transport.delete_comment(&slug, id).await?;
            overlay.apply_patch(&slug, CommentsPatch::Removed(id.to_string()));
            Ok(())
        })
        .await
    }
}
