//! Cancellation scope for component lifecycles

use std::sync::Arc;
use tokio::sync::watch;

/// A cancellation scope that can be triggered once and observed by any
/// number of clones.
///
/// Cancelling is idempotent. Clones share the same state, so a host that
/// derives work from a component can hold a clone and wait on
/// [`CancelToken::cancelled`] for the component to close.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the token. Returns `true` only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token has been cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
