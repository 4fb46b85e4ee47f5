//! File system watch backends for the change notifier.
//!
//! A backend turns the watch target list into a live set of OS watches that
//! push [`ChangeEvent`]s into an `mpsc` channel. The returned [`WatchHandle`]
//! owns those watches: dropping it stops every one of them and closes the
//! channel from the sending side.
//!
//! Each target gets its own non-recursive `notify` watcher, so the target an
//! event came from is known without matching paths. Targets missing when the
//! set is opened are skipped and stay unwatched for the life of the set.

use std::any::Any;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use openclaw_dash_core::Aggregator;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::event::{watch_targets, ChangeEvent};

/// Keeps a set of watches alive. Dropping it releases them.
pub struct WatchHandle {
    _guard: Box<dyn Any + Send>,
}

impl WatchHandle {
    pub fn new<G: Send + 'static>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }

    pub fn noop() -> Self {
        Self::new(())
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WatchHandle")
    }
}

/// Source of change events for the notifier hub.
pub trait WatchBackend: Send + Sync + 'static {
    /// Start watching and forward events into `tx` until the handle drops.
    fn open(&self, tx: mpsc::Sender<ChangeEvent>) -> WatchHandle;
}

/// Watches nothing; subscriptions only carry keepalives.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl WatchBackend for NullBackend {
    fn open(&self, _tx: mpsc::Sender<ChangeEvent>) -> WatchHandle {
        WatchHandle::noop()
    }
}

/// Watches the state files and agent session directories with `notify`.
pub struct NotifyBackend {
    aggregator: Arc<Aggregator>,
    agent_ids: Vec<String>,
}

impl NotifyBackend {
    /// `agent_ids` fixes the watched session directories; when empty, the
    /// agent roster is read each time the watch set is opened.
    pub fn new(aggregator: Arc<Aggregator>, agent_ids: Vec<String>) -> Self {
        Self {
            aggregator,
            agent_ids,
        }
    }

    fn agent_ids(&self) -> Vec<String> {
        if self.agent_ids.is_empty() {
            self.aggregator
                .agents()
                .iter()
                .map(|agent| agent.id.clone())
                .collect()
        } else {
            self.agent_ids.clone()
        }
    }
}

impl WatchBackend for NotifyBackend {
    fn open(&self, tx: mpsc::Sender<ChangeEvent>) -> WatchHandle {
        let layout = self.aggregator.layout();
        let dropped = Arc::new(AtomicU64::new(0));
        let mut watchers: Vec<RecommendedWatcher> = Vec::new();

        for target in watch_targets(&self.agent_ids()) {
            let Some(path) = target.path(layout) else {
                debug!(?target, "Watch target has an unusable agent id; skipped");
                continue;
            };
            if !path.exists() {
                debug!(path = %path.display(), "Watch target missing; skipped");
                continue;
            }
            match watch_path(&path, target.event(), tx.clone(), dropped.clone()) {
                Ok(watcher) => watchers.push(watcher),
                Err(e) => debug!(path = %path.display(), error = %e, "Could not watch target; skipped"),
            }
        }

        debug!(
            root = %layout.root().display(),
            watches = watchers.len(),
            "Opened state directory watches"
        );
        WatchHandle::new(WatchSet { watchers, dropped })
    }
}

/// The watchers of one connection, with the count of events they could not
/// queue. The count is reported when the set closes.
struct WatchSet {
    watchers: Vec<RecommendedWatcher>,
    dropped: Arc<AtomicU64>,
}

impl Drop for WatchSet {
    fn drop(&mut self) {
        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            info!(watches = self.watchers.len(), dropped, "Closed watches; some change events were dropped");
        } else {
            debug!(watches = self.watchers.len(), "Closed watches");
        }
    }
}

/// Watch one path; every create, modify or remove under it emits `event`.
fn watch_path(
    path: &Path,
    event: ChangeEvent,
    tx: mpsc::Sender<ChangeEvent>,
    dropped_counter: Arc<AtomicU64>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        match res {
            Ok(fs_event) => {
                if !matches!(
                    fs_event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                if tx.try_send(event.clone()).is_err() {
                    let count = dropped_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if count == 1 || count % 100 == 0 {
                        warn!(dropped_total = count, "Change channel full; event dropped");
                    }
                }
            }
            Err(e) => {
                error!("File watcher error: {}", e);
            }
        }
    })?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openclaw_dash_core::StateLayout;
    use std::time::Duration;
    use tokio::time::timeout;

    fn backend(root: &Path, agent_ids: &[&str]) -> NotifyBackend {
        let aggregator = Arc::new(Aggregator::new(StateLayout::new(root)));
        NotifyBackend::new(aggregator, agent_ids.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_file_change_is_reported_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("healthcheck.log");
        std::fs::write(&log, "").unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let handle = backend(dir.path(), &["main"]).open(tx);

        // Give the OS watch a moment to register before mutating.
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&log, "2024-01-01 00:00:00 UTC ERROR: disk full\n").unwrap();

        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change event within 5s")
            .expect("channel closed early");
        assert_eq!(
            event,
            ChangeEvent::FileChange {
                file: "healthcheck.log".to_string()
            }
        );

        drop(handle);
        // Once the watches are gone the channel closes; drain whatever was
        // already queued and expect the end of the stream.
        let closed = timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok(), "channel stayed open after the handle dropped");
    }

    #[tokio::test]
    async fn test_session_dir_change() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = dir.path().join("agents").join("main").join("sessions");
        std::fs::create_dir_all(&sessions).unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let _handle = backend(dir.path(), &["main", "missing"]).open(tx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(sessions.join("sessions.json"), "{}").unwrap();

        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change event within 5s")
            .expect("channel closed early");
        assert_eq!(
            event,
            ChangeEvent::SessionChange {
                agent_id: "main".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_nothing_to_watch_closes_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let handle = backend(dir.path(), &[]).open(tx);

        assert!(rx.try_recv().is_err());
        drop(handle);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_null_backend() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = NullBackend.open(tx);
        drop(handle);
        assert!(rx.recv().await.is_none());
    }
}
