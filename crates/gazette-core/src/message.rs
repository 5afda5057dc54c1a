//! Curated messages and their enrichment-readiness machinery.
//!
//! Every chat message captured during an active session may spawn zero or
//! more background enrichment workers (archive a referenced link, upload
//! an attachment). A message is *ready* exactly when no workers are
//! outstanding; the content join barrier waits on that condition for
//! every message before generation runs.
//!
//! The worker count is broadcast over a `watch` channel, so waiters park
//! on a one-shot wakeup instead of polling. Workers receive a child
//! `CancellationToken`; cancelling the wait requests best-effort
//! cancellation of outstanding work without blocking the canceller. A
//! worker that finishes after cancellation still decrements safely -- its
//! span writes simply land on a message nobody will render.

use std::future::Future;
use std::sync::Arc;

use gazette_types::error::EnrichError;
use gazette_types::identity::MessageId;
use gazette_types::message::MessageFlags;
use gazette_types::span::Span;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// A chat message captured during an active session.
///
/// Mutated in place by its enrichment workers until the worker count
/// reaches zero; consumed by the content generator once ready.
pub struct Message {
    id: MessageId,
    flags: MessageFlags,
    spans: Mutex<Vec<Span>>,
    /// Signed count of outstanding enrichment workers, kept inside the
    /// watch channel so every change is both serialized and broadcast;
    /// waiters park on zero.
    outstanding: watch::Sender<i64>,
    /// Parent token for this message's workers.
    cancel: CancellationToken,
    /// Worker failures, reported out-of-band after publish. Never affect
    /// readiness.
    errors: Mutex<Vec<EnrichError>>,
}

impl Message {
    /// Create a message from its captured content.
    ///
    /// A message with no workers scheduled is ready immediately.
    pub fn new(id: MessageId, flags: MessageFlags, spans: Vec<Span>) -> Arc<Self> {
        let (outstanding, _) = watch::channel(0);
        Arc::new(Self {
            id,
            flags,
            spans: Mutex::new(spans),
            outstanding,
            cancel: CancellationToken::new(),
            errors: Mutex::new(Vec::new()),
        })
    }

    /// Platform-assigned message id.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Delivery flags recorded at capture time.
    pub fn flags(&self) -> MessageFlags {
        self.flags
    }

    /// Cloned snapshot of the current span list.
    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().clone()
    }

    /// Mutate the span list in place (enrichment workers use this to fill
    /// in archived/uploaded URLs).
    pub fn update_spans<R>(&self, f: impl FnOnce(&mut Vec<Span>) -> R) -> R {
        f(&mut self.spans.lock())
    }

    /// Register a background enrichment worker and run it.
    ///
    /// The outstanding count is incremented before the task is spawned
    /// and decremented on every exit path (a drop guard covers panics).
    /// A worker returning `Err` has the error recorded on the message for
    /// later out-of-band reporting; readiness is unaffected.
    pub fn add_worker<F, Fut>(self: &Arc<Self>, work: F)
    where
        F: FnOnce(Arc<Message>, CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), EnrichError>> + Send + 'static,
    {
        self.outstanding.send_modify(|count| *count += 1);

        let message = Arc::clone(self);
        let token = self.cancel.child_token();
        tokio::spawn(async move {
            let _guard = WorkerGuard {
                message: Arc::clone(&message),
            };
            if let Err(error) = work(Arc::clone(&message), token).await {
                warn!(id = %message.id, %error, "enrichment worker failed");
                message.errors.lock().push(error);
            }
        });
    }

    /// Whether all enrichment workers have finished.
    pub fn ready(&self) -> bool {
        *self.outstanding.borrow() == 0
    }

    /// Block until the message is ready or `cancel` fires.
    ///
    /// Returns `true` when ready. On cancellation, best-effort
    /// cancellation of outstanding workers is requested and `false` is
    /// returned without waiting for them to stop.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        let mut count_rx = self.outstanding.subscribe();
        tokio::select! {
            result = count_rx.wait_for(|count| *count == 0) => match result {
                Ok(_) => true,
                // The sender lives inside self, so this arm is effectively
                // unreachable; fall back to the counter if it ever isn't.
                Err(_) => self.ready(),
            },
            _ = cancel.cancelled() => {
                trace!(id = %self.id, "readiness wait cancelled");
                self.cancel.cancel();
                false
            }
        }
    }

    /// Drain the worker errors collected so far.
    ///
    /// The platform adapter calls this after publish to notify the user
    /// best-effort about enrichments that failed.
    pub fn take_errors(&self) -> Vec<EnrichError> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Release the message's resources after it has been consumed:
    /// cancels any straggler workers and drops the span list.
    pub fn dispose(&self) {
        self.cancel.cancel();
        self.spans.lock().clear();
    }
}

/// Decrements the outstanding count exactly once, on every exit path.
struct WorkerGuard {
    message: Arc<Message>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.message.outstanding.send_modify(|count| *count -= 1);
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("outstanding", &*self.outstanding.borrow())
            .finish()
    }
}
