//! Paginated Query Engine
//!
//! Turns a query descriptor (selection, filters, page) into a consistent
//! (results, loading-state, page-count) view. Descriptors are replaced, not
//! mutated; replacing selection or filters resets the page to 1. Every
//! replacement starts a new fetch cycle tagged with a generation number,
//! and a resolving fetch whose generation is stale is discarded: the most
//! recently issued descriptor always wins, regardless of response arrival
//! order.

pub mod tags;

pub use tags::TagList;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cell::{StateCell, StateWatch};
use crate::effect::{Effect, EffectBus};
use crate::model::{Article, LoadingState};
use crate::session::SessionStore;
use crate::transport::{PageQuery, Transport};

/// Which slice of the article corpus a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    All,
    Feed,
    ByTag,
    ByAuthor,
    FavoritedBy,
}

/// Server-side filter parameters carried by a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
}

/// The tuple driving a paginated fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub selection: SelectionType,
    pub filters: Filters,
    pub page: u64,
}

impl QueryDescriptor {
    /// Fresh descriptor on page 1.
    pub fn new(selection: SelectionType, filters: Filters) -> Self {
        Self {
            selection,
            filters,
            page: 1,
        }
    }

    pub fn all() -> Self {
        Self::new(SelectionType::All, Filters::default())
    }

    pub fn feed() -> Self {
        Self::new(SelectionType::Feed, Filters::default())
    }

    pub fn by_tag(tag: impl Into<String>) -> Self {
        Self::new(
            SelectionType::ByTag,
            Filters {
                tag: Some(tag.into()),
                ..Filters::default()
            },
        )
    }

    pub fn by_author(author: impl Into<String>) -> Self {
        Self::new(
            SelectionType::ByAuthor,
            Filters {
                author: Some(author.into()),
                ..Filters::default()
            },
        )
    }

    pub fn favorited_by(username: impl Into<String>) -> Self {
        Self::new(
            SelectionType::FavoritedBy,
            Filters {
                favorited: Some(username.into()),
                ..Filters::default()
            },
        )
    }

    /// Wire parameters for this descriptor:
    /// `offset = page_size * (page - 1)`.
    pub fn to_page_query(&self, page_size: u64) -> PageQuery {
        PageQuery {
            tag: self.filters.tag.clone(),
            author: self.filters.author.clone(),
            favorited: self.filters.favorited.clone(),
            limit: page_size,
            offset: page_size * (self.page - 1),
        }
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self::all()
    }
}

/// Paginated article list store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ArticleFeed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    descriptor: StateCell<QueryDescriptor>,
    loading: StateCell<LoadingState>,
    results: StateCell<Vec<Article>>,
    page_count: StateCell<u64>,
    /// Tags in-flight fetches; bumped on every descriptor replacement.
    generation: AtomicU64,
    /// Serializes generation bumps against result publication.
    publish: Mutex<()>,
    page_size: u64,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
}

impl ArticleFeed {
    /// The feed starts idle (`NotLoaded`); the first
    /// [`ArticleFeed::set_query`] enters the view.
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        effects: EffectBus,
        page_size: u64,
    ) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                descriptor: StateCell::new(QueryDescriptor::default()),
                loading: StateCell::new(LoadingState::NotLoaded),
                results: StateCell::new(Vec::new()),
                page_count: StateCell::new(0),
                generation: AtomicU64::new(0),
                publish: Mutex::new(()),
                page_size,
                transport,
                session,
                effects,
            }),
        }
    }

    /// Replace selection and filters; the page resets to 1 and a new fetch
    /// cycle starts.
    ///
    /// A feed selection while anonymous never reaches the transport: a
    /// login navigation effect fires instead.
    pub fn set_query(&self, selection: SelectionType, filters: Filters) {
        self.inner
            .descriptor
            .force_set(QueryDescriptor::new(selection, filters));
        Arc::clone(&self.inner).refresh();
    }

    /// Keep selection and filters, move to `page`.
    pub fn set_page(&self, page: u64) {
        let mut descriptor = self.inner.descriptor.get();
        descriptor.page = page.max(1);
        self.inner.descriptor.force_set(descriptor);
        Arc::clone(&self.inner).refresh();
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        self.inner.descriptor.get()
    }

    pub fn current_page(&self) -> u64 {
        self.inner.descriptor.get().page
    }

    pub fn loading(&self) -> LoadingState {
        self.inner.loading.get()
    }

    pub fn loading_watch(&self) -> StateWatch<LoadingState> {
        self.inner.loading.watch()
    }

    pub fn results(&self) -> Vec<Article> {
        self.inner.results.get()
    }

    pub fn results_watch(&self) -> StateWatch<Vec<Article>> {
        self.inner.results.watch()
    }

    pub fn page_count(&self) -> u64 {
        self.inner.page_count.get()
    }

    /// Pagination row, derived on read, never stored.
    pub fn page_numbers(&self) -> Vec<u64> {
        (1..=self.inner.page_count.get()).collect()
    }
}

impl FeedInner {
    fn refresh(self: Arc<Self>) {
        let descriptor = self.descriptor.get();
        if descriptor.selection == SelectionType::Feed && !self.session.is_authenticated() {
            debug!("feed requested while anonymous; redirecting to login");
            self.effects.emit(Effect::NavigateToLogin);
            return;
        }

        let generation = {
            let _guard = self.publish.lock();
            self.loading.set(LoadingState::Loading);
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tokio::spawn(async move {
            self.run_fetch(descriptor, generation).await;
        });
    }

    async fn run_fetch(&self, descriptor: QueryDescriptor, generation: u64) {
        let query = descriptor.to_page_query(self.page_size);
        let outcome = match descriptor.selection {
            SelectionType::Feed => self.transport.feed_articles(&query).await,
            _ => self.transport.list_articles(&query).await,
        };

        let _guard = self.publish.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "superseded fetch discarded");
            return;
        }
        match outcome {
            Ok(list) => {
                self.page_count.set(list.page_count(self.page_size));
                self.results.set(list.articles);
                self.loading.set(LoadingState::Loaded);
            }
            Err(err) => {
                // Loading state deliberately stays LOADING; consumers read
                // the stuck spinner as the failure signal.
                warn!(%err, "article list fetch failed");
            }
        }
    }
}
