//! The fixed check registry.
//!
//! Every check produces one [`CheckResult`], which is written to the run
//! log as exactly two lines: `CHECK: <name>` then `RECOMMENDATION: <detail>`.

pub mod disk;
pub mod load;
pub mod memory;
pub mod services;
pub mod updates;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;
use crate::logger::RunLog;
use crate::package::PackageBackend;
use crate::probe::SystemProbe;

pub const CHECK_PREFIX: &str = "CHECK: ";
pub const RECOMMENDATION_PREFIX: &str = "RECOMMENDATION: ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn pass(name: &str, detail: impl Into<String>) -> Self {
        CheckResult {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        CheckResult {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }

    pub fn check_line(&self) -> String {
        format!("{CHECK_PREFIX}{}", self.name)
    }

    pub fn recommendation_line(&self) -> String {
        format!("{RECOMMENDATION_PREFIX}{}", self.detail)
    }
}

/// What a check may look at.
pub struct CheckContext<'a> {
    pub probe: &'a dyn SystemProbe,
    pub backend: &'a dyn PackageBackend,
    pub config: &'a Config,
}

#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must not fail: probe errors become a non-passing result.
    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult;
}

pub fn registry() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(disk::DiskUsage),
        Box::new(memory::MemoryUsage),
        Box::new(load::CpuLoad),
        Box::new(services::ServiceStatus),
        Box::new(updates::PendingUpdates),
    ]
}

pub fn emit(log: &mut RunLog, result: &CheckResult) {
    log.log(result.check_line());
    log.log(result.recommendation_line());
}
