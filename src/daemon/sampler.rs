use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};

use crate::{process_api::ProcessProbe, utils::clock::Clock};

use super::catalog::{AppCatalog, AppName};

/// One second of user attention attributed to a tracked app.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub app: AppName,
    pub timestamp: DateTime<Local>,
}

/// Samples the process table on a fixed schedule and forwards attributed seconds to the
/// accounting module. Sampling never mutates the store.
pub struct SamplerModule {
    next: mpsc::Sender<UsageEvent>,
    probe: Box<dyn ProcessProbe>,
    catalog: AppCatalog,
    shutdown: CancellationToken,
    sampling_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl SamplerModule {
    pub fn new(
        next: mpsc::Sender<UsageEvent>,
        probe: Box<dyn ProcessProbe>,
        catalog: AppCatalog,
        shutdown: CancellationToken,
        sampling_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            probe,
            catalog,
            shutdown,
            sampling_interval,
            time_provider,
        }
    }

    fn sample(&mut self) -> Result<Option<UsageEvent>> {
        let observations = self.probe.observations()?;
        let event = self.catalog.attribute(&observations).map(|app| UsageEvent {
            app,
            timestamp: self.time_provider.time(),
        });
        Ok(event)
    }

    /// Executes the sampler event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut sampling_point = self.time_provider.instant();
        loop {
            sampling_point += self.sampling_interval;

            match self.sample() {
                Ok(Some(event)) => {
                    let span = info_span!("Processing sampled event");
                    debug!("Sending event {:?}", event);
                    self.next
                        .send(event)
                        .instrument(span)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                    info!("Successfully sent event")
                }
                Ok(None) => {
                    debug!("No tracked app is active")
                }
                Err(e) => {
                    // A denied scan only skips this tick. The loop has to survive
                    // occasional introspection failures indefinitely.
                    error!("Encountered an error during sampling {:?}", e)
                }
            }

            tokio::select! {
                // Cancelation means we stop execution of the event loop. Which means we also drop
                // the sender channel and consequently stop the accounting module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(sampling_point) => ()
            }
        }
    }
}
