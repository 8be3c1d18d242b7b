use async_trait::async_trait;

use super::{Check, CheckContext, CheckResult};
use crate::package::UpdateStatus;

pub const NAME: &str = "Pending Updates";
pub const NOT_IMPLEMENTED: &str = "Update check not implemented for this distribution.";

pub struct PendingUpdates;

#[async_trait]
impl Check for PendingUpdates {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult {
        match ctx.backend.query_updates(ctx.probe).await {
            Ok(status) => evaluate(status, ctx.backend.name()),
            Err(e) => CheckResult::fail(NAME, format!("Could not query pending updates ({e}).")),
        }
    }
}

pub fn evaluate(status: UpdateStatus, manager: &str) -> CheckResult {
    match status {
        UpdateStatus::Unsupported => CheckResult::pass(NAME, NOT_IMPLEMENTED),
        UpdateStatus::Count(0) => CheckResult::pass(NAME, "System is up to date. No action needed."),
        UpdateStatus::Count(1) => {
            CheckResult::fail(NAME, format!("1 package update available via {manager}. Consider upgrading."))
        }
        UpdateStatus::Count(n) => {
            CheckResult::fail(NAME, format!("{n} package updates available via {manager}. Consider upgrading."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message() {
        let result = evaluate(UpdateStatus::Unsupported, "none");
        assert!(result.passed);
        assert_eq!(result.detail, NOT_IMPLEMENTED);
    }

    #[test]
    fn counts() {
        assert!(evaluate(UpdateStatus::Count(0), "pacman").passed);
        let result = evaluate(UpdateStatus::Count(12), "apt-get");
        assert!(!result.passed);
        assert_eq!(result.detail, "12 package updates available via apt-get. Consider upgrading.");
    }
}
