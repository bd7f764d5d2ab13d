//! Article write actions: editor save, deletion, favorite toggle.

use std::sync::Arc;

use crate::cell::{StateCell, StateWatch};
use crate::effect::{Effect, EffectBus};
use crate::error::{ErrorSet, TransportError};
use crate::model::{Article, ArticleDraft};
use crate::mutation::{run_guarded, SubmissionGuard};
use crate::overlay::{ArticlePatch, Overlay};
use crate::session::SessionStore;
use crate::transport::Transport;

/// The editor form surface: create when there is no slug yet, update
/// otherwise.
pub struct EditorActions {
    transport: Arc<dyn Transport>,
    effects: EffectBus,
    guard: SubmissionGuard,
    errors: StateCell<Option<ErrorSet>>,
}

impl EditorActions {
    pub fn new(transport: Arc<dyn Transport>, effects: EffectBus) -> Self {
        Self {
            transport,
            effects,
            guard: SubmissionGuard::new(),
            errors: StateCell::new(None),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub fn errors(&self) -> Option<ErrorSet> {
        self.errors.get()
    }

    pub fn errors_watch(&self) -> StateWatch<Option<ErrorSet>> {
        self.errors.watch()
    }

    /// Success: navigate to the article's detail view.
    pub async fn save(
        &self,
        slug: Option<&str>,
        draft: ArticleDraft,
    ) -> Option<Result<Article, TransportError>> {
        run_guarded(&self.guard, Some(&self.errors), async {
            let article = match slug {
                Some(slug) => self.transport.update_article(slug, &draft).await?,
                None => self.transport.create_article(&draft).await?,
            };
            self.effects
                .emit(Effect::NavigateToArticle(article.slug.clone()));
            Ok(article)
        })
        .await
    }
}

/// Actions against an existing article: delete and favorite toggle.
pub struct ArticleActions {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
    delete_guard: SubmissionGuard,
    favorite_guard: SubmissionGuard,
}

impl ArticleActions {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        effects: EffectBus,
    ) -> Self {
        Self {
            transport,
            session,
            effects,
            delete_guard: SubmissionGuard::new(),
            favorite_guard: SubmissionGuard::new(),
        }
    }

    pub fn is_deleting(&self) -> bool {
        self.delete_guard.is_submitting()
    }

    pub fn is_favoriting(&self) -> bool {
        self.favorite_guard.is_submitting()
    }

    pub fn favoriting_watch(&self) -> StateWatch<bool> {
        self.favorite_guard.watch()
    }

    /// Success: navigate to the article list.
    pub async fn delete(&self, slug: &str) -> Option<Result<(), TransportError>> {
        run_guarded(&self.delete_guard, None, async {
            self.transport.delete_article(slug).await?;
            self.effects.emit(Effect::NavigateHome);
            Ok(())
        })
        .await
    }

    /// Flip the favorite state of the focused article.
    ///
    /// Anonymous viewers are sent to registration without a transport call.
    /// Success folds a `FavoriteToggled` patch onto the overlay; the count
    /// moves by exactly one, no re-fetch.
    pub async fn toggle_favorite(
        &self,
        overlay: &Overlay<Article>,
    ) -> Option<Result<(), TransportError>> {
        if !self.session.is_authenticated() {
            self.effects.emit(Effect::NavigateToRegister);
            return None;
        }
        let article = overlay.value()?;
        run_guarded(&self.favorite_guard, None, async {
            let favorited = !article.favorited;
            if favorited {
                self.transport.favorite(&article.slug).await?;
            } else {
                self.transport.unfavorite(&article.slug).await?;
            }
            overlay.apply_patch(&article.slug, ArticlePatch::FavoriteToggled { favorited });
            Ok(())
        })
        .await
    }
}
