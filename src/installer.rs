use serde::Serialize;
use tracing::info;

use crate::logger::RunLog;
use crate::package::PackageBackend;
use crate::probe::SystemProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed,
    Failed,
}

impl InstallOutcome {
    pub fn tool_available(self) -> bool {
        !matches!(self, InstallOutcome::Failed)
    }
}

/// Makes sure the banner tool is on PATH. Never fails the run: every
/// problem is logged and reported as `Failed`.
pub async fn ensure_installed(
    probe: &dyn SystemProbe,
    backend: &dyn PackageBackend,
    tool: &str,
    allow_install: bool,
    log: &mut RunLog,
) -> InstallOutcome {
    if probe.tool_available(tool) {
        log.log(format!("{tool} is already installed."));
        return InstallOutcome::AlreadyPresent;
    }
    if !allow_install {
        log.log(format!("{tool} not found and automatic install is disabled; using generic banner."));
        return InstallOutcome::Failed;
    }

    info!(tool, manager = backend.name(), "installing banner tool");
    match backend.attempt_install(probe, tool).await {
        Ok(()) if probe.tool_available(tool) => {
            log.log(format!("{tool} not found; installed it with {}.", backend.name()));
            InstallOutcome::Installed
        }
        Ok(()) => {
            log.log(format!(
                "{tool} install with {} reported success but {tool} is still not on PATH; using generic banner.",
                backend.name()
            ));
            InstallOutcome::Failed
        }
        Err(e) => {
            log.log(format!("{tool} not found; install failed ({e}); using generic banner."));
            InstallOutcome::Failed
        }
    }
}
