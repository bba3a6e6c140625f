//! Run-wide cancellation signal backed by a `tokio::sync::watch` channel.

use tokio::sync::watch;

/// Sender half. Dropping it without calling [`CancelHandle::cancel`] never cancels.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even without live receivers.
        self.tx.send_replace(true);
    }
}

/// Receiver half, cheap to clone into every stage of a run.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Creates a connected handle/signal pair.
    #[must_use]
    pub fn channel() -> (CancelHandle, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Cancellation { rx })
    }

    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Cancellation {
        Self::channel().1
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if the handle
    /// was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn fresh_signal_is_not_cancelled() {
        let (_handle, signal) = Cancellation::channel();
        assert!(!signal.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_observed_by_clones() {
        let (handle, signal) = Cancellation::channel();
        let clone = signal.clone();
        handle.cancel();
        assert!(clone.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), clone.cancelled())
            .await
            .expect("cancelled() should resolve after cancel");
    }

    #[tokio::test]
    async fn never_does_not_resolve() {
        let signal = Cancellation::never();
        let res = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(res.is_err());
        assert!(!signal.is_cancelled());
    }
}
