//! Cancellation signal shared across one pipeline invocation.
//!
//! One handle/token pair is created per receiving-institution selection
//! and threaded through every fetch of both pipeline stages. Cancellation
//! is not an error: callers distinguish it from network failures and
//! never log it as one.

use tokio::sync::watch;

/// Sender side of the cancellation signal. Owned by the caller that
/// decides when the current selection is superseded (or by the Ctrl-C
/// handler).
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every in-flight fetch holding a token from this pair.
    pub fn cancel(&self) {
        // Receivers may already be gone; nothing to do then.
        let _ = self.tx.send(true);
    }
}

/// Receiver side of the cancellation signal; cheap to clone into each
/// concurrent fetch.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Whether cancellation has been requested.
    ///
    /// A dropped handle counts as cancelled: the selection that owned it
    /// no longer exists.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once cancellation is requested (or the handle is dropped).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Create a connected handle/token pair, initially not cancelled.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}
