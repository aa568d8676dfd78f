use std::{path::PathBuf, sync::Arc, time::Duration};

use accounting::AccountingModule;
use anyhow::Result;
use catalog::AppCatalog;
use limits::LimitMonitor;
use sampler::{SamplerModule, UsageEvent};
use store::{SNAPSHOT_FILE, usage_store::{SharedStore, UsageStore}};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    notify::{GenericNotifier, Notifier},
    process_api::{GenericProcessProbe, ProcessProbe},
    utils::clock::{Clock, DefaultClock},
};

pub mod accounting;
pub mod args;
pub mod catalog;
pub mod limits;
pub mod sampler;
pub mod shutdown;
pub mod store;

const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(1);

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    std::env::set_current_dir("/")?;

    let (sender, receiver) = mpsc::channel::<UsageEvent>(10);

    let store = UsageStore::open(dir.join(SNAPSHOT_FILE)).await?;
    let tracked = store.tracked_apps();
    let catalog =
        AppCatalog::default_catalog().with_tracked_apps(tracked.iter().map(String::as_str));
    let store: SharedStore = Arc::new(tokio::sync::Mutex::new(store));

    let shutdown_token = CancellationToken::new();

    let sampler = create_sampler(
        sender,
        GenericProcessProbe::new(),
        catalog,
        &shutdown_token,
        DefaultClock,
    );

    let accountant = create_accountant(receiver, store, Box::new(GenericNotifier::new()));

    let (_, sampling_result, accounting_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        sampler.run(),
        accountant.run(),
    );

    if let Err(sampling_result) = sampling_result {
        error!("Sampler module got an error {:?}", sampling_result);
    }

    if let Err(accounting_result) = accounting_result {
        error!("Accounting module got an error {:?}", accounting_result);
    }

    Ok(())
}

fn create_sampler(
    sender: mpsc::Sender<UsageEvent>,
    probe: impl ProcessProbe,
    catalog: AppCatalog,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> SamplerModule {
    SamplerModule::new(
        sender,
        Box::new(probe),
        catalog,
        shutdown_token.clone(),
        DEFAULT_SAMPLING_INTERVAL,
        Box::new(clock),
    )
}

fn create_accountant(
    receiver: mpsc::Receiver<UsageEvent>,
    store: SharedStore,
    notifier: Box<dyn Notifier>,
) -> AccountingModule {
    AccountingModule::new(receiver, store, LimitMonitor::new(notifier))
}

#[cfg(test)]
mod daemon_tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            catalog::AppCatalog,
            create_accountant, create_sampler,
            sampler::UsageEvent,
            store::{SNAPSHOT_FILE, usage_store::UsageStore},
        },
        notify::LogNotifier,
        process_api::{MockProcessProbe, ProcessObservation},
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    const TEST_START_DATE: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    fn test_observations() -> Vec<Vec<ProcessObservation>> {
        vec![
            vec![ProcessObservation {
                process_name: Arc::from("chrome"),
                cmdline: vec![Arc::from("chrome")],
                window_title: None,
            }],
            vec![ProcessObservation {
                process_name: Arc::from("nvim"),
                cmdline: vec![Arc::from("nvim")],
                window_title: None,
            }],
            vec![ProcessObservation {
                process_name: Arc::from("chrome"),
                cmdline: vec![Arc::from("chrome"), Arc::from("https://youtube.com/watch")],
                window_title: None,
            }],
        ]
    }

    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Local>,
        reference: Instant,
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    /// Very simple smoke test to check if the application is working properly. It can be improved
    /// by warping time so that it takes 10 times less time, but for now we have what we have.
    #[tokio::test]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let mut probe = MockProcessProbe::new();
        let mut items = test_observations().into_iter().cycle();
        probe
            .expect_observations()
            .returning(move || Ok(items.next().unwrap()))
            .times(..7);

        let shutdown_token = CancellationToken::new();

        let (sender, receiver) = mpsc::channel::<UsageEvent>(10);
        let test_clock = TestClock {
            start_time: Local.from_local_datetime(&TEST_START_DATE).unwrap(),
            reference: Instant::now(),
        };
        let sampler = create_sampler(
            sender,
            probe,
            AppCatalog::default_catalog(),
            &shutdown_token,
            test_clock.clone(),
        );

        let dir = tempdir()?;
        let store = Arc::new(tokio::sync::Mutex::new(
            UsageStore::open(dir.path().join(SNAPSHOT_FILE)).await?,
        ));

        let accountant = create_accountant(receiver, store.clone(), Box::new(LogNotifier));

        let (_, sampling_result, accounting_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(5500)).await;
                shutdown_token.cancel()
            },
            sampler.run(),
            accountant.run(),
        );

        sampling_result?;
        accounting_result?;

        let restored = UsageStore::open(dir.path().join(SNAPSHOT_FILE)).await?;
        let today = TEST_START_DATE.date();
        let total =
            restored.today_usage("Google Chrome", today) + restored.today_usage("YouTube", today);
        assert!(total >= 2, "expected sampled seconds, got {total}");
        assert_eq!(restored.today_usage("nvim", today), 0);

        Ok(())
    }
}
