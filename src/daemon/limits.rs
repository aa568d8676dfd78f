use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use crate::notify::Notifier;

use super::catalog::AppName;

/// Decides when a limit-exceeded notification fires. Each app is either below its limit
/// or already notified today; the day-stamp of the last notification is the whole state,
/// so a calendar rollover re-arms the app on its own.
///
/// The stamps are not persisted. A daemon restarted mid-day may notify once more for an
/// app already over its limit that day.
pub struct LimitMonitor {
    notifier: Box<dyn Notifier>,
    notified: HashMap<AppName, NaiveDate>,
}

impl LimitMonitor {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            notified: HashMap::new(),
        }
    }

    /// Runs the limit check for `app` right after a second was recorded. Fires at most
    /// once per app per calendar day, at the first second where accumulated usage
    /// reaches the limit. A limit of 0 means the app is tracked without a limit.
    pub fn check(
        &mut self,
        app: &AppName,
        today: NaiveDate,
        used_seconds: u64,
        limit_minutes: u64,
        notifications_enabled: bool,
    ) {
        if limit_minutes == 0 || used_seconds < limit_minutes * 60 {
            return;
        }
        if self.notified.get(app) == Some(&today) {
            return;
        }
        // When notifications are off the day is left unstamped, so turning them back on
        // mid-day still produces the day's single notification.
        if !notifications_enabled {
            return;
        }

        self.notified.insert(app.clone(), today);
        info!("Usage limit reached for {app} ({used_seconds}s >= {limit_minutes}m)");
        self.notifier.notify(
            &format!("{app} Usage Limit"),
            &format!("You have exceeded your daily limit for {app}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use chrono::NaiveDate;

    use crate::notify::MockNotifier;

    use super::LimitMonitor;

    fn test_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap()
    }

    fn counting_notifier(calls: &Arc<AtomicU64>) -> Box<MockNotifier> {
        let calls = calls.clone();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().returning(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        Box::new(notifier)
    }

    #[test]
    fn test_notifies_once_at_first_second_over_limit() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut monitor = LimitMonitor::new(counting_notifier(&calls));
        let app = Arc::from("YouTube");
        let day = test_day();

        let mut fired_at = None;
        for second in 1..=70 {
            monitor.check(&app, day, second, 1, true);
            if fired_at.is_none() && calls.load(Ordering::SeqCst) == 1 {
                fired_at = Some(second);
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fired_at, Some(60));
    }

    #[test]
    fn test_day_rollover_rearms_notification() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut monitor = LimitMonitor::new(counting_notifier(&calls));
        let app = Arc::from("Netflix");
        let day = test_day();
        let next_day = day.succ_opt().unwrap();

        monitor.check(&app, day, 60, 1, true);
        monitor.check(&app, day, 3600, 1, true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        monitor.check(&app, next_day, 60, 1, true);
        monitor.check(&app, next_day, 61, 1, true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_limit_never_notifies() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);
        let mut monitor = LimitMonitor::new(Box::new(notifier));
        let app = Arc::from("Firefox");

        monitor.check(&app, test_day(), 86400, 0, true);
    }

    #[test]
    fn test_disabled_notifications_do_not_consume_the_day() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut monitor = LimitMonitor::new(counting_notifier(&calls));
        let app = Arc::from("YouTube");
        let day = test_day();

        monitor.check(&app, day, 60, 1, false);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        monitor.check(&app, day, 61, 1, true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_apps_are_tracked_independently() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut monitor = LimitMonitor::new(counting_notifier(&calls));
        let day = test_day();

        monitor.check(&Arc::from("YouTube"), day, 60, 1, true);
        monitor.check(&Arc::from("Netflix"), day, 120, 2, true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
