//! # Network Monitor
//!
//! Caches the environment's reachability flag and republishes every
//! reported transition to subscribers.
//!
//! ## Features
//!
//! - **Connectivity Detection**: online/offline as reported by the host, no probing
//! - **Real-time Updates**: `watch` subscribers are notified on each event
//! - **Scoped Listeners**: event sources attached with [`ConnectivityObserver::attach`]
//!   stay registered until their [`ListenerGuard`] is dropped
//!
//! Transitions are passed through raw: a flap is reported as two events.

use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Reachability transition reported by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

impl From<bool> for ConnectivityEvent {
    fn from(online: bool) -> Self {
        if online {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    /// Banner text
    pub fn label(&self) -> &'static str {
        match self {
            NetworkStatus::Online => "Connected",
            NetworkStatus::Offline => "No connection - offline mode",
        }
    }
}

/// Snapshot published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub online: bool,
    /// Time of the latest "became reachable" report
    pub last_online_at: Option<DateTime<Utc>>,
}

/// Cached online/offline signal
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone)]
pub struct ConnectivityObserver {
    state: Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityObserver {
    /// Start from the environment's current reachability flag
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(ConnectivityState {
            online: initially_online,
            last_online_at: initially_online.then(Utc::now),
        });
        Self {
            state: Arc::new(state),
        }
    }

    pub fn is_online(&self) -> bool {
        self.state.borrow().online
    }

    pub fn status(&self) -> NetworkStatus {
        if self.is_online() {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        }
    }

    pub fn last_online_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_online_at
    }

    pub fn snapshot(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    /// Receiver notified on every reported transition
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    /// Record one environment event and notify subscribers
    pub fn apply(&self, event: ConnectivityEvent) {
        let online = event == ConnectivityEvent::Online;
        self.state.send_modify(|state| {
            state.online = online;
            if online {
                state.last_online_at = Some(Utc::now());
            }
        });
        info!("Network: {}", if online { "Online" } else { "Offline" });
    }

    pub fn set_online(&self, online: bool) {
        self.apply(ConnectivityEvent::from(online));
    }

    /// Forward events from `source` until it ends or the guard is dropped
    pub fn attach<S>(&self, source: S) -> ListenerGuard
    where
        S: Stream<Item = ConnectivityEvent> + Send + 'static,
    {
        let observer = self.clone();
        let handle = tokio::spawn(async move {
            futures_util::pin_mut!(source);
            while let Some(event) = source.next().await {
                observer.apply(event);
            }
            debug!("connectivity event source ended");
        });
        ListenerGuard {
            handle: Some(handle),
        }
    }
}

/// Registration of an environment event source
///
/// Dropping the guard unregisters the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    handle: Option<JoinHandle<()>>,
}

impl ListenerGuard {
    /// Whether the listener task is still forwarding events
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Unregister now
    pub fn detach(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("connectivity listener detached");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.abort();
    }
}
