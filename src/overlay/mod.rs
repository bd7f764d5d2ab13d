//! Optimistic Overlay
//!
//! Presents a single focused entity (article, profile, comment thread) as
//! an always-current value: the remote snapshot is fetched once per focus
//! key and cached for late subscribers, and local mutation patches fold
//! onto the latest known value without a re-fetch. An overlay is
//! instantiated per focus key; navigating to a new key means a new
//! instance, and dropping the old one cancels every observable effect of
//! its in-flight fetch.

pub mod patch;

pub use patch::{ArticlePatch, CommentsPatch, ProfilePatch};

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::cell::{StateCell, StateWatch};
use crate::effect::{Effect, EffectBus};
use crate::error::TransportError;

/// A value that can serve as overlay focus: it knows its own focus key and
/// how to fold a local patch onto itself.
pub trait Focused: Clone + Send + Sync + 'static {
    type Patch: std::fmt::Debug + Send;

    fn focus_key(&self) -> &str;

    fn fold(&mut self, patch: Self::Patch);
}

/// Lifecycle of the focused value.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState<T> {
    NotLoaded,
    Loaded(T),
    /// The remote fetch failed; the focus is dead. Published exactly once.
    Failed(String),
}

impl<T> OverlayState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            OverlayState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, OverlayState::Failed(_))
    }
}

/// The fetch an overlay runs once for its focus key.
pub type FocusFetch<T> = BoxFuture<'static, Result<T, TransportError>>;

pub struct Overlay<T: Focused> {
    key: String,
    state: StateCell<OverlayState<T>>,
    effects: EffectBus,
    /// Emitted once if the remote fetch fails (e.g. navigate away from a
    /// missing article). `None` fails quietly.
    failure_effect: Option<Effect>,
}

impl<T: Focused + PartialEq> Overlay<T> {
    /// Create the overlay for `key` and start its one remote fetch.
    ///
    /// The fetch task holds only a weak reference: an overlay dropped by
    /// navigation makes the resolution of its in-flight fetch unobservable.
    pub fn spawn_load(
        key: impl Into<String>,
        fetch: FocusFetch<T>,
        effects: EffectBus,
        failure_effect: Option<Effect>,
    ) -> Arc<Self> {
        let overlay = Arc::new(Self {
            key: key.into(),
            state: StateCell::new(OverlayState::NotLoaded),
            effects,
            failure_effect,
        });

        let weak = Arc::downgrade(&overlay);
        tokio::spawn(async move {
            let outcome = fetch.await;
            let Some(overlay) = weak.upgrade() else {
                debug!("focus dropped before fetch resolved");
                return;
            };
            match outcome {
                Ok(value) => {
                    overlay.state.set(OverlayState::Loaded(value));
                }
                Err(err) => {
                    warn!(key = %overlay.key, %err, "focused fetch failed");
                    overlay.state.set(OverlayState::Failed(err.to_string()));
                    if let Some(effect) = overlay.failure_effect.clone() {
                        overlay.effects.emit(effect);
                    }
                }
            }
        });

        overlay
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> OverlayState<T> {
        self.state.get()
    }

    /// Merged feed: replays the cached state, then live changes.
    pub fn watch(&self) -> StateWatch<OverlayState<T>> {
        self.state.watch()
    }

    /// Snapshot of the loaded value, if any.
    pub fn value(&self) -> Option<T> {
        self.state.get().loaded().cloned()
    }

    /// Fold a local patch onto the latest known value.
    ///
    /// A patch keyed to another focus is discarded (stale delivery after
    /// navigation must not leak across entities), as is any patch against
    /// an unloaded or dead focus.
    pub fn apply_patch(&self, key: &str, patch: T::Patch) {
        if key != self.key {
            debug!(
                target_key = %key,
                focus_key = %self.key,
                ?patch,
                "patch for another focus discarded"
            );
            return;
        }
        self.state.replace_if(|state| match state {
            OverlayState::Loaded(value) => {
                let mut next = value.clone();
                next.fold(patch);
                Some(OverlayState::Loaded(next))
            }
            _ => {
                debug!(key = %self.key, "patch against unloaded focus discarded");
                None
            }
        });
    }
}
