//! Follow/unfollow actions.

use std::sync::Arc;

use crate::cell::StateWatch;
use crate::effect::{Effect, EffectBus};
use crate::error::TransportError;
use crate::model::{Article, Profile};
use crate::mutation::{run_guarded, SubmissionGuard};
use crate::overlay::{ArticlePatch, Overlay, ProfilePatch};
use crate::session::SessionStore;
use crate::transport::Transport;

/// One follow button. The same instance serves a profile page focus or an
/// article page's author line; each folds its own patch shape.
pub struct FollowAction {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
    guard: SubmissionGuard,
}

impl FollowAction {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        effects: EffectBus,
    ) -> Self {
        Self {
            transport,
            session,
            effects,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub fn submitting_watch(&self) -> StateWatch<bool> {
        self.guard.watch()
    }

    /// Flip the follow relation on a focused profile.
    ///
    /// Anonymous viewers are sent to login without a transport call.
    pub async fn toggle_profile(
        &self,
        overlay: &Overlay<Profile>,
    ) -> Option<Result<(), TransportError>> {
        if !self.session.is_authenticated() {
            self.effects.emit(Effect::NavigateToLogin);
            return None;
        }
        let profile = overlay.value()?;
        run_guarded(&self.guard, None, async {
            let following = !profile.following;
            self.call(&profile.username, following).await?;
            overlay.apply_patch(&profile.username, ProfilePatch::FollowToggled { following });
            Ok(())
        })
        .await
    }

    /// Flip the follow relation on a focused article's author.
    pub async fn toggle_author(
        &self,
        overlay: &Overlay<Article>,
    ) -> Option<Result<(), TransportError>> {
        if !self.session.is_authenticated() {
            self.effects.emit(Effect::NavigateToLogin);
            return None;
        }
        let article = overlay.value()?;
        run_guarded(&self.guard, None, async {
            let following = !article.author.following;
            self.call(&article.author.username, following).await?;
            overlay.apply_patch(
                &article.slug,
                ArticlePatch::AuthorFollowToggled { following },
            );
            Ok(())
        })
        .await
    }

    async fn call(&self, username: &str, following: bool) -> Result<(), TransportError> {
        if following {
            self.transport.follow(username).await?;
        } else {
            self.transport.unfollow(username).await?;
        }
        Ok(())
    }
}
