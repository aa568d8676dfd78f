use chrono::{Duration, NaiveDate};

/// Returns the `n` most recent days ending with `today`, oldest first. Used for weekly
/// breakdowns where days without usage must still be present.
pub fn last_n_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| today - Duration::days(offset as i64))
        .collect()
}
