//! Popular-tag sidebar store.

use std::sync::Arc;

use tracing::warn;

use crate::cell::{StateCell, StateWatch};
use crate::model::LoadingState;
use crate::transport::Transport;

/// One-shot store for the popular tag list. Clones share state.
#[derive(Clone)]
pub struct TagList {
    inner: Arc<TagsInner>,
}

struct TagsInner {
    loading: StateCell<LoadingState>,
    tags: StateCell<Vec<String>>,
    transport: Arc<dyn Transport>,
}

impl TagList {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(TagsInner {
                loading: StateCell::new(LoadingState::NotLoaded),
                tags: StateCell::new(Vec::new()),
                transport,
            }),
        }
    }

    /// Start the fetch. Safe to call again to refresh.
    pub fn load(&self) {
        let inner = Arc::clone(&self.inner);
        inner.loading.set(LoadingState::Loading);
        tokio::spawn(async move {
            match inner.transport.list_tags().await {
                Ok(tags) => {
                    inner.tags.set(tags);
                    inner.loading.set(LoadingState::Loaded);
                }
                Err(err) => {
                    warn!(%err, "tag list fetch failed");
                }
            }
        });
    }

    pub fn loading(&self) -> LoadingState {
        self.inner.loading.get()
    }

    pub fn tags(&self) -> Vec<String> {
        self.inner.tags.get()
    }

    pub fn tags_watch(&self) -> StateWatch<Vec<String>> {
        self.inner.tags.watch()
    }
}
