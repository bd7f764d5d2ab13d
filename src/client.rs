//! Client facade and composition root.
//!
//! Constructs the stores once and hands out references; every consumer gets
//! the same session store, effect bus and transport. Tests assemble the
//! same facade around fake parts.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::effect::{Effect, EffectBus, EffectStream};
use crate::error::StorageError;
use crate::model::{Article, CommentThread, Profile};
use crate::mutation::{
    ArticleActions, AuthActions, CommentActions, EditorActions, FollowAction, SettingsActions,
};
use crate::overlay::Overlay;
use crate::query::{ArticleFeed, TagList};
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, TokenVault};
use crate::transport::{HttpTransport, Transport};

pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
}

impl Client {
    /// Wire up the configured storage backend and the HTTP transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, StorageError> {
        let store = config.storage.build()?;
        let vault = Arc::new(TokenVault::new(Arc::clone(&store)));
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(config.api.base_url.clone(), vault));
        Ok(Self::with_transport(config, transport, store))
    }

    /// Assemble around explicit parts (used by tests to substitute fakes).
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let vault = Arc::new(TokenVault::new(store));
        let session = SessionStore::new(vault);
        Self {
            config,
            transport,
            session,
            effects: EffectBus::new(),
        }
    }

    /// Restore a persisted session, if any. Run once at startup.
    pub async fn bootstrap(&self) {
        self.session.revalidate(self.transport.as_ref()).await;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    /// Navigation effects for the host router.
    pub fn effects(&self) -> EffectStream {
        self.effects.subscribe()
    }

    /// A paginated article list view.
    pub fn article_feed(&self) -> ArticleFeed {
        ArticleFeed::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            self.effects.clone(),
            self.config.api.page_size,
        )
    }

    /// The popular-tag sidebar store.
    pub fn tag_list(&self) -> TagList {
        TagList::new(Arc::clone(&self.transport))
    }

    /// Focus an article by slug. A failed fetch navigates home.
    pub fn article(&self, slug: &str) -> Arc<Overlay<Article>> {
        let transport = Arc::clone(&self.transport);
        let owned = slug.to_string();
        Overlay::spawn_load(
            slug,
            Box::pin(async move { transport.get_article(&owned).await }),
            self.effects.clone(),
            Some(Effect::NavigateHome),
        )
    }

    /// Focus a profile by username. A failed fetch navigates home.
    pub fn profile(&self, username: &str) -> Arc<Overlay<Profile>> {
        let transport = Arc::clone(&self.transport);
        let owned = username.to_string();
        Overlay::spawn_load(
            username,
            Box::pin(async move { transport.get_profile(&owned).await }),
            self.effects.clone(),
            Some(Effect::NavigateHome),
        )
    }

    /// Focus an article's comment thread. Fails quietly.
    pub fn comments(&self, slug: &str) -> Arc<Overlay<CommentThread>> {
        let transport = Arc::clone(&self.transport);
        let owned = slug.to_string();
        Overlay::spawn_load(
            slug,
            Box::pin(async move {
                let comments = transport.list_comments(&owned).await?;
                Ok(CommentThread {
                    slug: owned,
                    comments,
                })
            }),
            self.effects.clone(),
            None,
        )
    }

    pub fn auth_actions(&self) -> AuthActions {
        AuthActions::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            self.effects.clone(),
        )
    }

    pub fn settings_actions(&self) -> SettingsActions {
        SettingsActions::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            self.effects.clone(),
        )
    }

    pub fn editor_actions(&self) -> EditorActions {
        EditorActions::new(Arc::clone(&self.transport), self.effects.clone())
    }

    pub fn article_actions(&self) -> ArticleActions {
        ArticleActions::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            self.effects.clone(),
        )
    }

    pub fn follow_action(&self) -> FollowAction {
        FollowAction::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            self.effects.clone(),
        )
    }

    pub fn comment_actions(&self) -> CommentActions {
        CommentActions::new(Arc::clone(&self.transport))
    }
}
