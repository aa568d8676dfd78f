use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The struct used for storing data on the disk. The whole store is one snapshot object:
/// accumulated seconds per app per local calendar day, configured limit minutes per app,
/// and user settings. Ordered maps keep repeated serializations of the same state
/// byte-identical. Fields this version doesn't know are ignored on load, so snapshots
/// written by newer versions stay readable.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// App name -> `YYYY-MM-DD` local date -> accumulated seconds. Accumulators only grow.
    #[serde(default)]
    pub usage: BTreeMap<String, BTreeMap<NaiveDate, u64>>,
    /// App name -> daily limit in minutes. 0 means tracked without a limit.
    #[serde(default)]
    pub limits: BTreeMap<String, u64>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_notification_enabled")]
    pub notification_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_enabled: true,
        }
    }
}

fn default_notification_enabled() -> bool {
    true
}
