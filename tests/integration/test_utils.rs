//! Shared test utilities for integration tests
//!
//! Provides a scripted in-memory transport plus entity factories, so every
//! test drives the real stores against deterministic responses. Delays are
//! expressed with tokio time and meant to run under `start_paused` tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use quill::client::Client;
use quill::config::ClientConfig;
use quill::error::{ErrorSet, TransportError};
use quill::model::{
    Article, ArticleDraft, ArticleList, Comment, Identity, IdentityUpdate, LoginCredentials,
    Profile, RegisterCredentials,
};
use quill::storage::MemoryKeyValueStore;
use quill::transport::{PageQuery, Transport};

pub fn identity(username: &str, token: &str) -> Identity {
    Identity {
        username: username.to_string(),
        email: format!("{username}@example.test"),
        bio: None,
        image: None,
        token: token.to_string(),
    }
}

pub fn profile(username: &str) -> Profile {
    Profile {
        username: username.to_string(),
        bio: None,
        image: None,
        following: false,
    }
}

pub fn article(slug: &str, favorites: u64) -> Article {
    Article {
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        description: "about".to_string(),
        body: "body".to_string(),
        tag_list: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
        favorited: false,
        favorites_count: favorites,
        author: profile("jake"),
    }
}

pub fn comment(id: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        body: body.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        author: profile("anna"),
    }
}

/// A list response with `count` articles, sluggged by `prefix`.
pub fn article_list(prefix: &str, count: usize, total: u64) -> ArticleList {
    ArticleList {
        articles: (0..count)
            .map(|i| article(&format!("{prefix}-{i}"), 0))
            .collect(),
        articles_count: total,
    }
}

/// One scripted list response with an artificial latency.
#[derive(Clone)]
pub struct ScriptedList {
    pub delay: Duration,
    pub list: ArticleList,
}

impl ScriptedList {
    pub fn immediate(list: ArticleList) -> Self {
        Self {
            delay: Duration::ZERO,
            list,
        }
    }

    pub fn delayed(delay: Duration, list: ArticleList) -> Self {
        Self { delay, list }
    }
}

/// Scripted transport. Every method either replays scripted state or
/// fails with a `Request` error, so a test never hits an endpoint it did
/// not mean to.
#[derive(Default)]
pub struct MockTransport {
    /// Returned by login/register/current_user when set.
    pub identity: Mutex<Option<Identity>>,
    /// When set, login and register fail with this validation feedback.
    pub rejection: Mutex<Option<ErrorSet>>,
    /// Makes current_user fail (expired session).
    pub session_expired: AtomicBool,

    /// Global list responses keyed by tag filter ("" for none).
    pub lists: Mutex<HashMap<String, ScriptedList>>,
    /// Personal feed response.
    pub feed: Mutex<Option<ScriptedList>>,
    /// When set, list/feed calls fail after their scripted delay.
    pub list_failure: AtomicBool,

    pub articles: Mutex<HashMap<String, Article>>,
    pub comments: Mutex<HashMap<String, Vec<Comment>>>,
    pub profiles: Mutex<HashMap<String, Profile>>,
    pub tags: Mutex<Vec<String>>,

    /// Latency applied to favorite/unfavorite/follow/unfollow/add_comment.
    pub write_delay: Mutex<Duration>,
    /// Latency applied to focused-entity reads (article/profile/comments).
    pub read_delay: Mutex<Duration>,

    /// Every PageQuery handed to list_articles, in call order.
    pub seen_queries: Mutex<Vec<PageQuery>>,

    pub list_calls: AtomicUsize,
    pub feed_calls: AtomicUsize,
    pub favorite_calls: AtomicUsize,
    pub unfavorite_calls: AtomicUsize,
    pub follow_calls: AtomicUsize,
    pub unfollow_calls: AtomicUsize,
    pub add_comment_calls: AtomicUsize,
    pub delete_comment_calls: AtomicUsize,
    pub get_article_calls: AtomicUsize,
    pub current_user_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    next_comment_id: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_identity(user: Identity) -> Arc<Self> {
        let transport = Self::new();
        *transport.identity.lock() = Some(user);
        transport
    }

    pub fn script_list(&self, tag: &str, scripted: ScriptedList) {
        self.lists.lock().insert(tag.to_string(), scripted);
    }

    pub fn script_article(&self, value: Article) {
        self.articles.lock().insert(value.slug.clone(), value);
    }

    pub fn script_profile(&self, value: Profile) {
        self.profiles.lock().insert(value.username.clone(), value);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock() = delay;
    }

    fn scripted_identity(&self) -> Result<Identity, TransportError> {
        if let Some(rejection) = self.rejection.lock().clone() {
            return Err(TransportError::Validation(rejection));
        }
        self.identity
            .lock()
            .clone()
            .ok_or_else(|| TransportError::Request("no identity scripted".to_string()))
    }

    async fn write_latency(&self) {
        let delay = *self.write_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn read_latency(&self) {
        let delay = *self.read_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<Identity, TransportError> {
        self.write_latency().await;
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.scripted_identity()
    }

    async fn register(
        &self,
        _credentials: &RegisterCredentials,
    ) -> Result<Identity, TransportError> {
        self.scripted_identity()
    }

    async fn current_user(&self) -> Result<Identity, TransportError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        if self.session_expired.load(Ordering::SeqCst) {
            return Err(TransportError::Unauthorized);
        }
        self.scripted_identity()
    }

    async fn update_user(&self, changes: &IdentityUpdate) -> Result<Identity, TransportError> {
        let mut updated = self.scripted_identity()?;
        if let Some(username) = &changes.username {
            updated.username = username.clone();
        }
        if let Some(email) = &changes.email {
            updated.email = email.clone();
        }
        if let Some(bio) = &changes.bio {
            updated.bio = Some(bio.clone());
        }
        if let Some(image) = &changes.image {
            updated.image = Some(image.clone());
        }
        *self.identity.lock() = Some(updated.clone());
        Ok(updated)
    }

    async fn list_articles(&self, query: &PageQuery) -> Result<ArticleList, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_queries.lock().push(query.clone());
        let key = query.tag.clone().unwrap_or_default();
        let scripted = self
            .lists
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| TransportError::Request(format!("no list scripted for '{key}'")))?;
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        if self.list_failure.load(Ordering::SeqCst) {
            return Err(TransportError::Request("scripted list failure".to_string()));
        }
        Ok(scripted.list)
    }

    async fn feed_articles(&self, _query: &PageQuery) -> Result<ArticleList, TransportError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .feed
            .lock()
            .clone()
            .ok_or_else(|| TransportError::Request("no feed scripted".to_string()))?;
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        if self.list_failure.load(Ordering::SeqCst) {
            return Err(TransportError::Request("scripted feed failure".to_string()));
        }
        Ok(scripted.list)
    }

    async fn get_article(&self, slug: &str) -> Result<Article, TransportError> {
        self.read_latency().await;
        self.get_article_calls.fetch_add(1, Ordering::SeqCst);
        self.articles
            .lock()
            .get(slug)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("/articles/{slug}")))
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, TransportError> {
        let slug = draft.title.to_lowercase().replace(' ', "-");
        let mut created = article(&slug, 0);
        created.title = draft.title.clone();
        created.description = draft.description.clone();
        created.body = draft.body.clone();
        created.tag_list = draft.tag_list.clone();
        Ok(created)
    }

    async fn update_article(
        &self,
        slug: &str,
        draft: &ArticleDraft,
    ) -> Result<Article, TransportError> {
        let mut updated = article(slug, 0);
        updated.title = draft.title.clone();
        updated.description = draft.description.clone();
        updated.body = draft.body.clone();
        Ok(updated)
    }

    async fn delete_article(&self, _slug: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn favorite(&self, slug: &str) -> Result<Article, TransportError> {
        self.write_latency().await;
        self.favorite_calls.fetch_add(1, Ordering::SeqCst);
        self.articles
            .lock()
            .get(slug)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("/articles/{slug}/favorite")))
    }

    async fn unfavorite(&self, slug: &str) -> Result<Article, TransportError> {
        self.write_latency().await;
        self.unfavorite_calls.fetch_add(1, Ordering::SeqCst);
        self.articles
            .lock()
            .get(slug)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("/articles/{slug}/favorite")))
    }

    async fn list_comments(&self, slug: &str) -> Result<Vec<Comment>, TransportError> {
        self.read_latency().await;
        Ok(self.comments.lock().get(slug).cloned().unwrap_or_default())
    }

    async fn add_comment(&self, _slug: &str, body: &str) -> Result<Comment, TransportError> {
        self.write_latency().await;
        self.add_comment_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(comment(&id.to_string(), body))
    }

    async fn delete_comment(&self, _slug: &str, _id: &str) -> Result<(), TransportError> {
        self.delete_comment_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_profile(&self, username: &str) -> Result<Profile, TransportError> {
        self.profiles
            .lock()
            .get(username)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("/profiles/{username}")))
    }

    async fn follow(&self, username: &str) -> Result<Profile, TransportError> {
        self.write_latency().await;
        self.follow_calls.fetch_add(1, Ordering::SeqCst);
        let mut followed = self
            .profiles
            .lock()
            .get(username)
            .cloned()
            .unwrap_or_else(|| profile(username));
        followed.following = true;
        Ok(followed)
    }

    async fn unfollow(&self, username: &str) -> Result<Profile, TransportError> {
        self.write_latency().await;
        self.unfollow_calls.fetch_add(1, Ordering::SeqCst);
        let mut unfollowed = self
            .profiles
            .lock()
            .get(username)
            .cloned()
            .unwrap_or_else(|| profile(username));
        unfollowed.following = false;
        Ok(unfollowed)
    }

    async fn list_tags(&self) -> Result<Vec<String>, TransportError> {
        Ok(self.tags.lock().clone())
    }
}

/// A client over the given transport plus the memory store backing its
/// token vault, so tests can inspect persisted state.
pub fn client_with(transport: Arc<MockTransport>) -> (Client, Arc<MemoryKeyValueStore>) {
    let store = MemoryKeyValueStore::shared();
    let client = Client::with_transport(ClientConfig::default(), transport, store.clone());
    (client, store)
}

/// Drive an overlay until its fetch resolves to a loaded value.
pub async fn loaded<T>(overlay: &quill::overlay::Overlay<T>) -> T
where
    T: quill::overlay::Focused + PartialEq,
{
    let mut watch = overlay.watch();
    loop {
        match watch.next().await.expect("overlay alive") {
            quill::overlay::OverlayState::Loaded(value) => return value,
            quill::overlay::OverlayState::NotLoaded => continue,
            quill::overlay::OverlayState::Failed(err) => panic!("focus fetch failed: {err}"),
        }
    }
}
