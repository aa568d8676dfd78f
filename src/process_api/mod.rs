//! Contains logic for observing running processes in different environments.
//! [GenericProcessProbe] is the main artifact of this module that abstracts
//! the operations.

pub mod sysinfo_probe;

use std::sync::Arc;

use anyhow::Result;

/// A single readable process at sampling time.
#[derive(Debug, Clone)]
pub struct ProcessObservation {
    /// Executable name. For example 'chrome' or 'firefox-bin'
    pub process_name: Arc<str>,
    /// Command line arguments of the process. Browsers started with a site url carry the
    /// domain here.
    pub cmdline: Vec<Arc<str>>,
    /// Title of the process window where the environment exposes one.
    pub window_title: Option<Arc<str>>,
}

/// Intended to serve as a contract every process scanning backend must implement.
///
/// A scan skips processes that are gone or unreadable instead of failing, so a single
/// zombie never aborts a tick.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessProbe: Send + 'static {
    fn observations(&mut self) -> Result<Vec<ProcessObservation>>;
}

/// Serves as a cross-compatible ProcessProbe implementation.
pub struct GenericProcessProbe {
    inner: Box<dyn ProcessProbe>,
}

impl GenericProcessProbe {
    pub fn new() -> Self {
        Self {
            inner: Box::new(sysinfo_probe::SysinfoProbe::new()),
        }
    }
}

impl ProcessProbe for GenericProcessProbe {
    fn observations(&mut self) -> Result<Vec<ProcessObservation>> {
        self.inner.observations()
    }
}
