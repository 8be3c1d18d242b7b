use async_trait::async_trait;

use super::{Check, CheckContext, CheckResult};
use crate::probe::MemoryTotals;

pub const NAME: &str = "Memory Usage";

pub struct MemoryUsage;

#[async_trait]
impl Check for MemoryUsage {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult {
        match ctx.probe.memory().await {
            Ok(totals) => evaluate(totals, ctx.config.thresholds.memory_usage_percent),
            Err(e) => CheckResult::fail(NAME, format!("Could not read memory totals ({e}).")),
        }
    }
}

pub fn evaluate(totals: MemoryTotals, threshold: u8) -> CheckResult {
    if totals.total == 0 {
        return CheckResult::fail(NAME, "Memory totals unavailable.");
    }
    let percent = totals.used as f64 * 100.0 / totals.total as f64;

    if percent > f64::from(threshold) {
        CheckResult::fail(
            NAME,
            format!("Memory usage above {threshold}% threshold, used={percent:.1}%. Check memory-hungry processes."),
        )
    } else {
        CheckResult::pass(
            NAME,
            format!("Memory usage {percent:.1}% is within the {threshold}% threshold. No action needed."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn under_threshold() {
        let result = evaluate(MemoryTotals { used: 4 * GIB, total: 16 * GIB }, 80);
        assert!(result.passed);
        assert!(result.detail.starts_with("Memory usage 25.0%"));
    }

    #[test]
    fn over_threshold() {
        let result = evaluate(MemoryTotals { used: 15 * GIB, total: 16 * GIB }, 80);
        assert!(!result.passed);
        assert!(result.detail.contains("used=93.8%"));
    }

    #[test]
    fn just_over_threshold_shows_decimal() {
        let result = evaluate(MemoryTotals { used: 804, total: 1000 }, 80);
        assert!(!result.passed);
        assert!(result.detail.contains("used=80.4%"), "{}", result.detail);
    }

    #[test]
    fn zero_total() {
        assert!(!evaluate(MemoryTotals { used: 0, total: 0 }, 80).passed);
    }
}
