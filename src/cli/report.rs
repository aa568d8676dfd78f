use ansi_term::Colour;
use chrono::NaiveDate;

use crate::daemon::store::usage_store::UsageStore;

/// Prints today's usage against configured limits, one app per row. Apps over their
/// limit are highlighted.
pub fn print_today(store: &UsageStore, today: NaiveDate) {
    let apps = store.tracked_apps();
    if apps.is_empty() {
        println!("No tracked apps yet. Add one with `timesink track <app>`.");
        return;
    }

    for app in apps {
        let used = store.today_usage(&app, today);
        let limit = store.limit(&app);

        let line = if limit > 0 {
            let percent = used * 100 / (limit * 60);
            format!(
                "{app}\t{} / {limit}m\t{percent}%",
                format_seconds(used)
            )
        } else {
            format!("{app}\t{}", format_seconds(used))
        };

        if limit > 0 && used >= limit * 60 {
            println!("{}", Colour::Red.paint(line));
        } else {
            println!("{line}");
        }
    }
}

/// Prints a per-day breakdown of the last 7 days, oldest first, for one app or for
/// every tracked app.
pub fn print_week(store: &UsageStore, app: Option<&str>, today: NaiveDate) {
    let apps = match app {
        Some(app) => vec![app.to_string()],
        None => store.tracked_apps(),
    };
    if apps.is_empty() {
        println!("No tracked apps yet. Add one with `timesink track <app>`.");
        return;
    }

    for app in apps {
        println!("{app}");
        for (date, seconds) in store.weekly_usage(&app, today) {
            println!("  {date}\t{}", format_seconds(seconds));
        }
    }
}

pub fn print_apps(store: &UsageStore) {
    let apps = store.tracked_apps();
    if apps.is_empty() {
        println!("No tracked apps yet. Add one with `timesink track <app>`.");
        return;
    }

    let limited = store.limited_apps();
    for app in apps {
        match limited.iter().find(|(name, _)| *name == app) {
            Some((_, minutes)) => println!("{app}\t{minutes}m daily"),
            None => println!("{app}\tno limit"),
        }
    }
}

fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let rest = seconds % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{rest}s")
    } else if minutes > 0 {
        format!("{minutes}m{rest}s")
    } else {
        format!("{rest}s")
    }
}

#[cfg(test)]
mod tests {
    use super::format_seconds;

    #[test]
    fn test_format_seconds_tiers() {
        assert_eq!(format_seconds(0), "0s");
        assert_eq!(format_seconds(59), "59s");
        assert_eq!(format_seconds(60), "1m0s");
        assert_eq!(format_seconds(301), "5m1s");
        assert_eq!(format_seconds(3600), "1h0m0s");
        assert_eq!(format_seconds(3725), "1h2m5s");
    }
}
