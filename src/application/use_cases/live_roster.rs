use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app_error::AppResult;
use crate::application::use_cases::status::{MemberStatus, StatusUseCases};
use crate::application::use_cases::visit::VisitChangeFeed;
use crate::domain::entities::visit_log::VisitChange;

// ============================================================================
// Subscription handle
// ============================================================================

/// A running change-feed listener. Dropping it stops the listener.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Calls `on_change` for every notification until the feed closes.
    /// A lagging receiver is reported as a single `Resync`.
    pub fn spawn<F, Fut>(mut changes: broadcast::Receiver<VisitChange>, mut on_change: F) -> Self
    where
        F: FnMut(VisitChange) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => on_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Change feed subscriber lagged, resyncing");
                        on_change(VisitChange::Resync).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Change feed closed");
                        break;
                    }
                }
            }
        });
        Self { handle }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the listener and waits until it has been torn down.
    pub async fn cancel(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn subscribe<F, Fut>(feed: &dyn VisitChangeFeed, on_change: F) -> Subscription
where
    F: FnMut(VisitChange) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Subscription::spawn(feed.subscribe(), on_change)
}

// ============================================================================
// Live roster
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RosterSnapshot {
    pub version: u64,
    pub members: Vec<MemberStatus>,
    pub refreshed_at: NaiveDateTime,
}

/// The status projection kept current by the visit change feed.
pub struct LiveRoster {
    snapshots: watch::Receiver<Arc<RosterSnapshot>>,
    subscription: Subscription,
}

impl LiveRoster {
    /// Subscribes before the first fetch so no change between the two is missed.
    pub async fn start(status: Arc<StatusUseCases>, feed: &dyn VisitChangeFeed) -> AppResult<Self> {
        let changes = feed.subscribe();
        let initial = RosterSnapshot {
            version: 1,
            members: status.list_with_status().await?,
            refreshed_at: Utc::now().naive_utc(),
        };
        let (tx, snapshots) = watch::channel(Arc::new(initial));
        let tx = Arc::new(tx);

        let subscription = Subscription::spawn(changes, move |change| {
            let status = status.clone();
            let tx = tx.clone();
            async move { refresh(&status, &tx, change).await }
        });

        info!("Live roster started");
        Ok(Self {
            snapshots,
            subscription,
        })
    }

    pub fn current(&self) -> Arc<RosterSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<RosterSnapshot>> {
        self.snapshots.clone()
    }

    /// Waits up to `timeout` for a snapshot newer than `version`, then returns the latest one.
    /// A `version` ahead of the roster (a client that outlived a restart) returns at once.
    pub async fn wait_newer_than(&self, version: u64, timeout: Duration) -> Arc<RosterSnapshot> {
        let current = self.current();
        if version > current.version {
            return current;
        }

        let mut rx = self.snapshots.clone();
        let wait = async move {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if snapshot.version > version {
                        return snapshot.clone();
                    }
                }
                if rx.changed().await.is_err() {
                    return rx.borrow().clone();
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(snapshot) => snapshot,
            Err(_) => self.current(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_active()
    }

    pub async fn shutdown(self) {
        self.subscription.cancel().await;
        info!("Live roster stopped");
    }
}

async fn refresh(
    status: &StatusUseCases,
    tx: &watch::Sender<Arc<RosterSnapshot>>,
    change: VisitChange,
) {
    debug!(?change, "Refreshing roster");
    match status.list_with_status().await {
        Ok(members) => {
            let version = tx.borrow().version + 1;
            tx.send_replace(Arc::new(RosterSnapshot {
                version,
                members,
                refreshed_at: Utc::now().naive_utc(),
            }));
        }
        Err(e) => {
            // Keep serving the previous snapshot.
            warn!(error = %e, "Roster refresh failed");
        }
    }
}
