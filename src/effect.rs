//! Navigation effect bus.
//!
//! The engine never drives the router directly; it emits effects and the
//! host application's router consumes them. Emission with no subscriber is
//! allowed and dropped.

use tokio::sync::broadcast;
use tracing::debug;

const EFFECT_CHANNEL_CAPACITY: usize = 16;

/// Side effects the engine asks the host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    NavigateHome,
    NavigateToLogin,
    NavigateToRegister,
    NavigateToArticle(String),
    NavigateToProfile(String),
}

#[derive(Clone)]
pub struct EffectBus {
    sender: broadcast::Sender<Effect>,
}

impl EffectBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EFFECT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, effect: Effect) {
        debug!(?effect, "effect emitted");
        // No receivers is fine: effects are advisory.
        let _ = self.sender.send(effect);
    }

    pub fn subscribe(&self) -> EffectStream {
        EffectStream {
            rx: self.sender.subscribe(),
        }
    }
}

impl Default for EffectBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of the effect bus.
pub struct EffectStream {
    rx: broadcast::Receiver<Effect>,
}

impl EffectStream {
    /// Next effect, or `None` once the bus is gone. Skips over lag gaps.
    pub async fn next(&mut self) -> Option<Effect> {
        loop {
            match self.rx.recv().await {
                Ok(effect) => return Some(effect),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "effect stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
