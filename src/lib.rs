//! Tracks time spent in a small set of named applications (browsers, streaming sites),
//! keeps per-day usage counters on disk, and raises a notification once per day when a
//! configured limit is exceeded. A cli exposes the stored data and the limit settings.
//!

pub mod cli;
pub mod daemon;
pub mod notify;
pub mod process_api;
pub mod utils;
