use std::sync::Arc;

use anyhow::Result;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System, UpdateKind};

use super::{ProcessObservation, ProcessProbe};

/// Process-table backed probe. sysinfo already drops processes that disappear or deny
/// access mid-scan, which matches the contract of [ProcessProbe].
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new_with_specifics(
                RefreshKind::nothing().with_processes(Self::refresh_kind()),
            ),
        }
    }

    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing()
            .with_cmd(UpdateKind::Always)
            .with_exe(UpdateKind::Always)
    }
}

impl ProcessProbe for SysinfoProbe {
    fn observations(&mut self) -> Result<Vec<ProcessObservation>> {
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());

        let observations = self
            .system
            .processes()
            .values()
            .map(|process| ProcessObservation {
                process_name: Arc::from(process.name().to_string_lossy().as_ref()),
                cmdline: process
                    .cmd()
                    .iter()
                    .map(|arg| Arc::from(arg.to_string_lossy().as_ref()))
                    .collect(),
                // The process table carries no window titles. Environments that expose
                // them can provide their own probe.
                window_title: None,
            })
            .collect();

        Ok(observations)
    }
}
