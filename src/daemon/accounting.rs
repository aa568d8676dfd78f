use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::{limits::LimitMonitor, sampler::UsageEvent, store::usage_store::SharedStore};

/// Recorded seconds between snapshot flushes. A crash loses at most this many unsaved
/// increments.
const FLUSH_EVERY_SECONDS: u32 = 60;

/// Consumes sampled seconds strictly in order: record, limit-check, optionally notify.
/// One event is fully accounted before the next one starts.
pub struct AccountingModule {
    receiver: Receiver<UsageEvent>,
    store: SharedStore,
    monitor: LimitMonitor,
    unsaved: u32,
}

impl AccountingModule {
    pub fn new(receiver: Receiver<UsageEvent>, store: SharedStore, monitor: LimitMonitor) -> Self {
        Self {
            receiver,
            store,
            monitor,
            unsaved: 0,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(event) = self.receiver.recv().await {
            debug!("Accounting event {:?}", event);
            match self.account(&event).await {
                Ok(_) => {
                    info!("Accounted event {:?}", event)
                }
                Err(e) => {
                    error!("Error accounting event {:?}: {e:?}", event)
                }
            }
        }

        let result = self.finalize().await;
        self.receiver.close();
        result
    }

    async fn account(&mut self, event: &UsageEvent) -> Result<()> {
        let day = event.timestamp.date_naive();

        let (used_seconds, limit_minutes, notifications_enabled) = {
            let mut store = self.store.lock().await;
            store.record_second(&event.app, day);
            (
                store.today_usage(&event.app, day),
                store.limit(&event.app),
                store.settings().notification_enabled,
            )
        };

        // The store lock is released before notification delivery so a slow backend
        // never blocks readers.
        self.monitor.check(
            &event.app,
            day,
            used_seconds,
            limit_minutes,
            notifications_enabled,
        );

        self.unsaved += 1;
        if self.unsaved >= FLUSH_EVERY_SECONDS {
            self.store.lock().await.persist().await?;
            self.unsaved = 0;
        }
        Ok(())
    }

    /// Flushes whatever the batched persistence hasn't written yet. Runs at clean
    /// shutdown; a failure here is surfaced to the daemon exit path.
    async fn finalize(&mut self) -> Result<()> {
        if self.unsaved > 0 {
            self.store.lock().await.persist().await?;
            self.unsaved = 0;
        }
        Ok(())
    }
}
