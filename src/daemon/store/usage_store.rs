use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::utils::time::last_n_days;

use super::snapshot::{Settings, StoreSnapshot};

/// The store shared between the accounting path and daemon wiring. Every mutating
/// operation locks the structure as a whole, so readers never observe a torn write.
pub type SharedStore = Arc<tokio::sync::Mutex<UsageStore>>;

const WEEK_DAYS: u32 = 7;

/// In-memory usage counters and limits backed by a single snapshot file.
///
/// The snapshot is shared between the daemon and the cli process, so reads take a shared
/// file lock and writes an exclusive one. Mutations only touch memory; callers decide
/// when a mutation is flushed through [UsageStore::persist].
pub struct UsageStore {
    path: PathBuf,
    data: StoreSnapshot,
}

impl UsageStore {
    /// Loads the snapshot at `path`, reinitializing to an empty store when the file is
    /// missing or unparsable. Only environment failures (permissions, io) are errors.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = Self::read_snapshot(&path).await?;
        Ok(Self { path, data })
    }

    async fn read_snapshot(path: &Path) -> Result<StoreSnapshot> {
        debug!("Loading snapshot from {path:?}");
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(StoreSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let mut raw = String::new();
        let result = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        result?;

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                // Might happen after shutdowns cutting off a write. Prior counters are
                // lost but the process keeps going.
                warn!("Snapshot at {path:?} was corrupted, reinitializing: {e}");
                Ok(StoreSnapshot::default())
            }
        }
    }

    /// Writes the whole snapshot to disk. Failures leave the in-memory state valid and
    /// bubble to whatever initiated the save.
    pub async fn persist(&self) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::write_snapshot(&mut file, &self.data).await;
        file.unlock_async().await?;
        result
    }

    async fn write_snapshot(file: &mut File, data: &StoreSnapshot) -> Result<()> {
        let buffer = serde_json::to_vec(data)?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }

    /// Attributes one elapsed second to `app` on `day`, creating nested entries on first
    /// use.
    pub fn record_second(&mut self, app: &str, day: NaiveDate) {
        let counter = self
            .data
            .usage
            .entry(app.to_string())
            .or_default()
            .entry(day)
            .or_insert(0);
        *counter += 1;
    }

    pub fn today_usage(&self, app: &str, today: NaiveDate) -> u64 {
        self.data
            .usage
            .get(app)
            .and_then(|days| days.get(&today))
            .copied()
            .unwrap_or(0)
    }

    /// Usage for the 7 most recent days including `today`, oldest first. Days without
    /// recorded usage yield 0.
    pub fn weekly_usage(&self, app: &str, today: NaiveDate) -> Vec<(NaiveDate, u64)> {
        last_n_days(today, WEEK_DAYS)
            .into_iter()
            .map(|day| (day, self.today_usage(app, day)))
            .collect()
    }

    pub fn set_limit(&mut self, app: &str, minutes: u64) {
        self.data.limits.insert(app.to_string(), minutes);
    }

    pub fn limit(&self, app: &str) -> u64 {
        self.data.limits.get(app).copied().unwrap_or(0)
    }

    /// Starts tracking `app` without a limit. An existing limit is left untouched.
    pub fn add_tracked(&mut self, app: &str) {
        self.data.limits.entry(app.to_string()).or_insert(0);
    }

    /// Deletes `app` from both usage history and limits.
    pub fn remove_app(&mut self, app: &str) {
        self.data.usage.remove(app);
        self.data.limits.remove(app);
    }

    /// Every app name with usage history or a limit entry.
    pub fn tracked_apps(&self) -> Vec<String> {
        let mut apps: Vec<String> = self
            .data
            .usage
            .keys()
            .chain(self.data.limits.keys())
            .cloned()
            .collect();
        apps.sort();
        apps.dedup();
        apps
    }

    /// App names with a configured limit, together with the limit minutes.
    pub fn limited_apps(&self) -> Vec<(String, u64)> {
        self.data
            .limits
            .iter()
            .filter(|(_, minutes)| **minutes > 0)
            .map(|(app, minutes)| (app.clone(), *minutes))
            .collect()
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.data.settings.notification_enabled = enabled;
    }
}
