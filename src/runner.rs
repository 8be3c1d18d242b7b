//! The health-check run: fixed sequence, never aborts part-way.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;
use tracing::info;

use crate::checks::{self, CheckContext, CheckResult};
use crate::config::Config;
use crate::display::{self, Banner};
use crate::distro::{self, Distribution};
use crate::installer::{self, InstallOutcome};
use crate::logger::RunLog;
use crate::package::backend_for;
use crate::probe::SystemProbe;

pub const RUN_END: &str = "=== syspulse health check completed ===";

pub fn run_start_marker(dist: Distribution) -> String {
    format!("=== syspulse health check started (distribution: {dist}) ===")
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub distribution: Distribution,
    pub install: InstallOutcome,
    pub banner: Banner,
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Failure only in strict mode when some check needs attention.
    pub fn exit_code(&self, strict: bool) -> ExitCode {
        if strict && !self.all_passed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

pub struct Runner<'a> {
    config: &'a Config,
    probe: &'a dyn SystemProbe,
    os_release: PathBuf,
    quiet: bool,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a Config, probe: &'a dyn SystemProbe) -> Self {
        Runner {
            config,
            probe,
            os_release: PathBuf::from(distro::OS_RELEASE),
            quiet: false,
        }
    }

    pub fn os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release = path.into();
        self
    }

    /// Print neither the banner nor the end-of-run transcript.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub async fn run(&self, log: &mut RunLog) -> RunSummary {
        log.clear();

        let distribution = distro::detect_from(&self.os_release);
        log.log(format!("Detected distribution: {distribution}"));
        let backend = backend_for(distribution);

        let install = installer::ensure_installed(
            self.probe,
            backend.as_ref(),
            &self.config.display.tool,
            self.config.display.install,
            log,
        )
        .await;

        if self.config.updates.refresh_index {
            match backend.refresh_index(self.probe).await {
                Ok(()) => log.log(format!("Package index refreshed with {}.", backend.name())),
                Err(e) => log.log(format!("Package index refresh skipped or failed ({e}).")),
            }
        }

        let (banner, art) = display::render_banner(
            self.probe,
            &self.config.display.tool,
            install.tool_available(),
        )
        .await;
        if !self.quiet {
            print!("{art}");
        }

        log.log(run_start_marker(distribution));
        info!(%distribution, "running checks");

        let ctx = CheckContext {
            probe: self.probe,
            backend: backend.as_ref(),
            config: self.config,
        };
        let mut results = Vec::new();
        for check in checks::registry() {
            let result = check.run(&ctx).await;
            checks::emit(log, &result);
            results.push(result);
        }

        log.log(RUN_END);

        if !self.quiet {
            println!();
            print!("{}", log.transcript());
        }

        RunSummary {
            distribution,
            install,
            banner,
            results,
        }
    }
}
