//! Mutation Coordinator
//!
//! Every write action in the system goes through the same contract: an
//! at-most-one-in-flight submission guard, uniform validation-error
//! capture, and a declared success effect (session update, overlay patch,
//! navigation, or handing the result back for the caller's form to clear).
//! Nothing retries automatically; guards always clear so the user can
//! resubmit.

pub mod article;
pub mod auth;
pub mod comment;
pub mod profile;

pub use article::{ArticleActions, EditorActions};
pub use auth::{AuthActions, SettingsActions};
pub use comment::CommentActions;
pub use profile::FollowAction;

use std::future::Future;

use tracing::debug;

use crate::cell::{StateCell, StateWatch};
use crate::error::{ErrorSet, TransportError};

/// Per-action in-flight flag.
///
/// True exactly while the action's transport call is outstanding. A second
/// invocation while in flight is ignored: no transport call, no error.
pub struct SubmissionGuard {
    flag: StateCell<bool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self {
            flag: StateCell::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.flag.get()
    }

    pub fn watch(&self) -> StateWatch<bool> {
        self.flag.watch()
    }

    /// Atomic test-and-set; false means an invocation is already in flight.
    pub(crate) fn try_begin(&self) -> bool {
        self.flag.replace_if(|busy| (!busy).then_some(true))
    }

    pub(crate) fn finish(&self) {
        self.flag.set(false);
    }
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one guarded invocation.
///
/// `op` is lazy: when the invocation is ignored because one is already in
/// flight, the future is dropped unpolled and nothing reaches the
/// transport, and the call returns `None`. Validation failures are mirrored
/// into `errors` (cleared on every accepted invocation); the guard clears
/// on every completion.
pub(crate) async fn run_guarded<T, Fut>(
    guard: &SubmissionGuard,
    errors: Option<&StateCell<Option<ErrorSet>>>,
    op: Fut,
) -> Option<Result<T, TransportError>>
where
    Fut: Future<Output = Result<T, TransportError>>,
{
    if !guard.try_begin() {
        debug!("duplicate submission ignored");
        return None;
    }
    if let Some(errors) = errors {
        errors.force_set(None);
    }

    let outcome = op.await;
    guard.finish();

    if let Err(err) = &outcome {
        if let (Some(errors), Some(set)) = (errors, err.validation()) {
            errors.force_set(Some(set.clone()));
        }
    }
    Some(outcome)
}
