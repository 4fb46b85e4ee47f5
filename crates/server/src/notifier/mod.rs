//! Change notifier: file system watches mapped to semantic events and fanned
//! out to every connected event stream.

pub mod event;
pub mod hub;
pub mod watcher;

pub use event::{watch_targets, ChangeEvent, WatchTarget};
pub use hub::{event_stream, NotifierHub, Push, Subscription};
pub use watcher::{NotifyBackend, NullBackend, WatchBackend, WatchHandle};
