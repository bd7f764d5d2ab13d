//! Session Store
//!
//! Single source of truth for "who is the current user". One identity value
//! (or absence) fans out to every consumer through distinct-change feeds;
//! the authenticated predicate is derived, never set directly. The store is
//! an explicit object constructed once by the client facade and passed by
//! reference, never a hidden global.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cell::{StateCell, StateWatch};
use crate::error::StorageError;
use crate::model::Identity;
use crate::storage::TokenVault;
use crate::transport::Transport;

pub struct SessionStore {
    identity: StateCell<Option<Identity>>,
    vault: Arc<TokenVault>,
}

impl SessionStore {
    /// Starts anonymous; call [`SessionStore::revalidate`] to restore a
    /// persisted session.
    pub fn new(vault: Arc<TokenVault>) -> Arc<Self> {
        Arc::new(Self {
            identity: StateCell::new(None),
            vault,
        })
    }

    /// Persist the identity's token and publish the identity.
    pub fn set_auth(&self, identity: Identity) -> Result<(), StorageError> {
        self.vault.save(&identity.token)?;
        self.identity.set(Some(identity));
        Ok(())
    }

    /// Remove the persisted token and publish absence. Idempotent.
    pub fn purge(&self) {
        if let Err(err) = self.vault.destroy() {
            // The in-memory session must still end even if the backend
            // refuses the remove.
            warn!(%err, "token removal failed during purge");
        }
        self.identity.set(None);
    }

    /// Snapshot of the current identity.
    pub fn identity(&self) -> Option<Identity> {
        self.identity.get()
    }

    /// Derived predicate: an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.get().is_some()
    }

    /// Identity feed: current value first, then every distinct change.
    pub fn identity_watch(&self) -> StateWatch<Option<Identity>> {
        self.identity.watch()
    }

    /// Identity feed: future distinct changes only.
    pub fn identity_changes(&self) -> StateWatch<Option<Identity>> {
        self.identity.changes()
    }

    /// Presence feed: current value first, then re-emits exactly when the
    /// identity transitions between present and absent, never on identity
    /// field changes.
    pub fn authentication_watch(&self) -> AuthWatch {
        AuthWatch {
            inner: self.identity.watch(),
            last: None,
        }
    }

    /// Restore a persisted session in the background.
    ///
    /// A present token is validated against `GET /user`; any failure purges
    /// so a half-valid identity can never be observed. An absent token goes
    /// straight to anonymous.
    pub async fn revalidate(&self, transport: &dyn Transport) {
        let token = match self.vault.token() {
            Ok(token) => token,
            Err(err) => {
                warn!(%err, "token read failed during revalidation");
                None
            }
        };
        if token.is_none() {
            self.purge();
            return;
        }
        match transport.current_user().await {
            Ok(identity) => {
                info!(username = %identity.username, "session revalidated");
                if let Err(err) = self.set_auth(identity) {
                    warn!(%err, "token refresh failed after revalidation");
                }
            }
            Err(err) => {
                info!(%err, "session revalidation rejected; purging");
                self.purge();
            }
        }
    }
}

/// Presence-transition subscription. See
/// [`SessionStore::authentication_watch`].
pub struct AuthWatch {
    inner: StateWatch<Option<Identity>>,
    last: Option<bool>,
}

impl AuthWatch {
    pub async fn next(&mut self) -> Option<bool> {
        loop {
            let identity = self.inner.next().await?;
            let present = identity.is_some();
            if self.last != Some(present) {
                self.last = Some(present);
                return Some(present);
            }
        }
    }
}
