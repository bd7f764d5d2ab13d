//! Authentication and settings write actions.

use std::sync::Arc;

use crate::cell::{StateCell, StateWatch};
use crate::effect::{Effect, EffectBus};
use crate::error::{ErrorSet, TransportError};
use crate::model::{Identity, IdentityUpdate, LoginCredentials, RegisterCredentials};
use crate::mutation::{run_guarded, SubmissionGuard};
use crate::session::SessionStore;
use crate::transport::Transport;

/// The login/register form surface. One form, one guard.
pub struct AuthActions {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
    guard: SubmissionGuard,
    errors: StateCell<Option<ErrorSet>>,
}

impl AuthActions {
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
            errors: StateCell::new(None),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub fn submitting_watch(&self) -> StateWatch<bool> {
        self.guard.watch()
    }

    pub fn errors(&self) -> Option<ErrorSet> {
        self.errors.get()
    }

    pub fn errors_watch(&self) -> StateWatch<Option<ErrorSet>> {
        self.errors.watch()
    }

    /// Success: session authenticated, navigate home. `None` means an
    /// invocation was already in flight.
    pub async fn login(
        &self,
        credentials: LoginCredentials,
    ) -> Option<Result<Identity, TransportError>> {
        run_guarded(&self.guard, Some(&self.errors), async {
            let identity = self.transport.login(&credentials).await?;
            self.session.set_auth(identity.clone())?;
            self.effects.emit(Effect::NavigateHome);
            Ok(identity)
        })
        .await
    }

    pub async fn register(
        &self,
        credentials: RegisterCredentials,
    ) -> Option<Result<Identity, TransportError>> {
        run_guarded(&self.guard, Some(&self.errors), async {
            let identity = self.transport.register(&credentials).await?;
            self.session.set_auth(identity.clone())?;
            self.effects.emit(Effect::NavigateHome);
            Ok(identity)
        })
        .await
    }

    /// Transport-free: purge the session and navigate home.
    pub fn logout(&self) {
        self.session.purge();
        self.effects.emit(Effect::NavigateHome);
    }
}

/// The profile settings form surface.
pub struct SettingsActions {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    effects: EffectBus,
    guard: SubmissionGuard,
    errors: StateCell<Option<ErrorSet>>,
}

impl SettingsActions {
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

    /// Success: the identity is replaced through the session store and the
    /// view moves to the (possibly renamed) profile.
    pub async fn update(
        &self,
        changes: IdentityUpdate,
    ) -> Option<Result<Identity, TransportError>> {
        run_guarded(&self.guard, Some(&self.errors), async {
            let identity = self.transport.update_user(&changes).await?;
            self.session.set_auth(identity.clone())?;
            self.effects
                .emit(Effect::NavigateToProfile(identity.username.clone()));
            Ok(identity)
        })
        .await
    }
}
