use async_trait::async_trait;

use super::{Check, CheckContext, CheckResult};

pub const NAME: &str = "CPU Load";

pub struct CpuLoad;

#[async_trait]
impl Check for CpuLoad {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult {
        match ctx.probe.load_average().await {
            Ok(load) => evaluate(load, ctx.config.thresholds.load_average),
            Err(e) => CheckResult::fail(NAME, format!("Could not read load average ({e}).")),
        }
    }
}

pub fn evaluate(load: f64, threshold: f64) -> CheckResult {
    if load > threshold {
        CheckResult::fail(
            NAME,
            format!("Load avg {load:.2} > {threshold:.2}, investigate running processes."),
        )
    } else {
        CheckResult::pass(
            NAME,
            format!("Load avg {load:.2} is within the {threshold:.2} threshold. No action needed."),
        )
    }
}
