//! Typed reactive state cell.
//!
//! A `StateCell` holds one value plus a version counter and broadcasts
//! replacements over a watch channel. Writers fold onto the latest value;
//! readers either replay the current value and then follow changes
//! (`watch`) or follow live changes only (`changes`). Duplicate consecutive
//! values are suppressed at the writer, so every observed emission is a
//! real change.

use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Versioned<T> {
    value: T,
    version: u64,
}

/// Single-value store with subscriber notification.
pub struct StateCell<T> {
    tx: watch::Sender<Versioned<T>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(Versioned { value, version: 0 });
        Self { tx }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().value.clone()
    }

    /// Version of the current value; increments on every accepted write.
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Replace the value unconditionally.
    pub fn force_set(&self, value: T) {
        self.tx.send_modify(|cur| {
            cur.value = value;
            cur.version += 1;
        });
    }

    /// Fold a mutation onto the latest value. Always notifies.
    pub fn update(&self, fold: impl FnOnce(&mut T)) {
        self.tx.send_modify(|cur| {
            fold(&mut cur.value);
            cur.version += 1;
        });
    }

    /// Subscription that yields the current value first, then every change.
    pub fn watch(&self) -> StateWatch<T> {
        StateWatch {
            rx: self.tx.subscribe(),
            seen: None,
        }
    }

    /// Subscription that yields future changes only.
    pub fn changes(&self) -> StateWatch<T> {
        let rx = self.tx.subscribe();
        let seen = Some(rx.borrow().version);
        StateWatch { rx, seen }
    }
}

impl<T: Clone + PartialEq> StateCell<T> {
    /// Replace the value, suppressing duplicate consecutive writes.
    ///
    /// Returns whether the value actually changed.
    pub fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|cur| {
            if cur.value == value {
                false
            } else {
                cur.value = value;
                cur.version += 1;
                true
            }
        })
    }

    /// Atomic conditional replacement: `decide` sees the current value and
    /// returns the replacement, or `None` to leave the cell untouched.
    ///
    /// Returns whether a replacement was written.
    pub fn replace_if(&self, decide: impl FnOnce(&T) -> Option<T>) -> bool {
        self.tx.send_if_modified(|cur| match decide(&cur.value) {
            Some(next) => {
                cur.value = next;
                cur.version += 1;
                true
            }
            None => false,
        })
    }
}

/// Reader side of a [`StateCell`].
pub struct StateWatch<T> {
    rx: watch::Receiver<Versioned<T>>,
    seen: Option<u64>,
}

impl<T: Clone> StateWatch<T> {
    /// Next unseen value. Returns `None` once the cell is dropped and all
    /// values have been observed.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            let current = {
                let guard = self.rx.borrow();
                if self.seen == Some(guard.version) {
                    None
                } else {
                    Some((guard.value.clone(), guard.version))
                }
            };
            if let Some((value, version)) = current {
                self.seen = Some(version);
                return Some(value);
            }
            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Snapshot of the current value without consuming an emission.
    pub fn peek(&self) -> T {
        self.rx.borrow().value.clone()
    }
}
