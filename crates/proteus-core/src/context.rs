//! Per-invocation execution context.
//!
//! The context is handed explicitly to the response strategies. It carries
//! the logging span of the invocation and an optional cancellation signal
//! coming from the caller's transport layer.

use tokio::sync::watch;
use tracing::Span;

/// Context of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct Context {
    span: Span,
    cancel: Option<watch::Receiver<bool>>,
}

impl Context {
    /// Creates a context logging into the given span.
    pub fn new(span: Span) -> Self {
        Self { span, cancel: None }
    }

    /// Creates a context that logs nowhere.
    pub fn detached() -> Self {
        Self::new(Span::none())
    }

    /// Creates a context together with the handle that cancels it.
    pub fn cancellable(span: Span) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                span,
                cancel: Some(rx),
            },
            CancelHandle { tx },
        )
    }

    /// Returns the logging span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves when cancellation is requested.
    ///
    /// Never resolves for contexts without a cancellation signal, or once the
    /// [`CancelHandle`] has been dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.cancel else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::detached()
    }
}

/// Requests cancellation of a [`Context`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation to every clone of the context.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_detached_context_is_never_cancelled() {
        let ctx = Context::detached();
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let (ctx, handle) = Context::cancellable(Span::none());
        assert!(!ctx.is_cancelled());

        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.cancelled().await })
        };
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation should be observed")
            .unwrap();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_uncancellable_context_stays_pending() {
        let ctx = Context::detached();
        let outcome = tokio::time::timeout(Duration::from_millis(20), ctx.cancelled()).await;
        assert!(outcome.is_err());
    }
}
