//! Per-connection change subscriptions.
//!
//! Each SSE connection holds a [`Subscription`] that owns its own watch set,
//! opened from the targets that exist when the connection is made. Every
//! open connection watches the same targets independently, so each one sees
//! every change; dropping the subscription releases its watches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_stream::Stream;
use tracing::{debug, warn};

use super::event::ChangeEvent;
use super::watcher::{WatchBackend, WatchHandle};

/// Queue depth per connection before events are dropped for it.
const SUBSCRIBER_CAPACITY: usize = 64;

pub struct NotifierHub {
    backend: Arc<dyn WatchBackend>,
    subscribers: AtomicUsize,
}

impl NotifierHub {
    pub fn new(backend: Arc<dyn WatchBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            subscribers: AtomicUsize::new(0),
        })
    }

    /// Open a watch set for a new connection.
    ///
    /// Opening touches the file system, so it runs on the blocking pool.
    /// If that task fails the subscription still works but never fires.
    pub async fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let backend = Arc::clone(&self.backend);
        let watch = match tokio::task::spawn_blocking(move || backend.open(tx)).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "Opening change watches failed; stream will only keep alive");
                WatchHandle::noop()
            }
        };

        let total = self.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(total, "Subscriber connected");

        Subscription {
            _watch: watch,
            rx,
            hub: Arc::clone(self),
        }
    }

    /// Connections currently holding a subscription.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for NotifierHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One connection's watch set and event queue. Dropping it releases both.
pub struct Subscription {
    // Declared before `rx` so the watches stop before the queue closes.
    _watch: WatchHandle,
    rx: mpsc::Receiver<ChangeEvent>,
    hub: Arc<NotifierHub>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let total = self.hub.subscribers.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(total, "Subscriber disconnected");
    }
}

/// An item on a subscriber's outgoing stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Push {
    Event(ChangeEvent),
    Keepalive,
}

/// `Connected`, then every event the subscription receives, interleaved
/// with a keepalive every `keepalive`. The subscription and its timer are
/// released when the stream is dropped.
pub fn event_stream(mut subscription: Subscription, keepalive: Duration) -> impl Stream<Item = Push> {
    async_stream::stream! {
        yield Push::Event(ChangeEvent::Connected);

        let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
        // Cleared once the watch set has nothing left to report; the
        // connection then only carries keepalives.
        let mut watching = true;
        loop {
            tokio::select! {
                event = subscription.recv(), if watching => match event {
                    Some(event) => {
                        yield Push::Event(event);
                    }
                    None => watching = false,
                },
                _ = ticker.tick() => {
                    yield Push::Keepalive;
                }
            }
        }
    }
}
