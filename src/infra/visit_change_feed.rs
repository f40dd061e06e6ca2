//! Change feeds for the visit log.
//!
//! `PgVisitChangeFeed` relays `NOTIFY visit_logs_changes` (raised by a trigger on
//! `visit_logs`). `PollingChangeFeed` emits `Resync` on a fixed interval when
//! LISTEN/NOTIFY is unavailable.

use std::time::Duration;

use serde::Deserialize;
use sqlx::{PgPool, postgres::PgListener};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::entities::visit_log::VisitChange, infra::error::InfraError,
    use_cases::visit::VisitChangeFeed,
};

pub const VISIT_CHANNEL: &str = "visit_logs_changes";

const FEED_CAPACITY: usize = 256;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct NotifyPayload {
    op: String,
    id: Uuid,
    member_id: Uuid,
}

/// Decodes a trigger payload. Anything unexpected becomes a `Resync`.
pub fn parse_notification(payload: &str) -> VisitChange {
    match serde_json::from_str::<NotifyPayload>(payload) {
        Ok(p) if p.op.eq_ignore_ascii_case("INSERT") => VisitChange::Inserted {
            visit_id: p.id,
            member_id: p.member_id,
        },
        Ok(p) => VisitChange::Updated {
            visit_id: p.id,
            member_id: p.member_id,
        },
        Err(e) => {
            warn!(error = %e, %payload, "Unreadable visit log notification");
            VisitChange::Resync
        }
    }
}

pub struct PgVisitChangeFeed {
    sender: broadcast::Sender<VisitChange>,
    task: JoinHandle<()>,
}

impl PgVisitChangeFeed {
    pub async fn start(pool: &PgPool) -> Result<Self, InfraError> {
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(InfraError::ChangeFeed)?;
        listener
            .listen(VISIT_CHANNEL)
            .await
            .map_err(InfraError::ChangeFeed)?;

        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        let task = tokio::spawn(relay_notifications(listener, sender.clone()));

        info!(channel = VISIT_CHANNEL, "Listening for visit log changes");
        Ok(Self { sender, task })
    }
}

async fn relay_notifications(mut listener: PgListener, sender: broadcast::Sender<VisitChange>) {
    loop {
        match listener.try_recv().await {
            Ok(Some(notification)) => {
                // No subscribers yet is fine.
                let _ = sender.send(parse_notification(notification.payload()));
            }
            Ok(None) => {
                // Connection dropped; the next call reconnects. Changes may have been missed.
                warn!("Visit log listener lost its connection, reconnecting");
                let _ = sender.send(VisitChange::Resync);
            }
            Err(e) => {
                error!(error = %e, "Visit log listener failed");
                sleep(RETRY_DELAY).await;
            }
        }
    }
}

impl VisitChangeFeed for PgVisitChangeFeed {
    fn subscribe(&self) -> broadcast::Receiver<VisitChange> {
        self.sender.subscribe()
    }
}

impl Drop for PgVisitChangeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct PollingChangeFeed {
    sender: broadcast::Sender<VisitChange>,
    task: JoinHandle<()>,
}

impl PollingChangeFeed {
    pub fn start(every: Duration) -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        let tx = sender.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let _ = tx.send(VisitChange::Resync);
            }
        });

        info!(every_secs = every.as_secs_f64(), "Polling for visit log changes");
        Self { sender, task }
    }
}

impl VisitChangeFeed for PollingChangeFeed {
    fn subscribe(&self) -> broadcast::Receiver<VisitChange> {
        self.sender.subscribe()
    }
}

impl Drop for PollingChangeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
