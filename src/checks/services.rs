use async_trait::async_trait;
use tracing::warn;

use super::{Check, CheckContext, CheckResult};

pub const NAME: &str = "Service Status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Inactive,
    /// The service manager could not be asked; holds the error text.
    Unknown(String),
}

pub struct ServiceStatus;

#[async_trait]
impl Check for ServiceStatus {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult {
        let mut states = Vec::new();
        for service in &ctx.config.thresholds.monitored_services {
            let state = match ctx.probe.service_active(service).await {
                Ok(true) => ServiceState::Active,
                Ok(false) => ServiceState::Inactive,
                Err(e) => {
                    warn!(service = %service, error = %e, "service state query failed");
                    ServiceState::Unknown(e.to_string())
                }
            };
            states.push((service.clone(), state));
        }
        evaluate(&states)
    }
}

pub fn evaluate(states: &[(String, ServiceState)]) -> CheckResult {
    if states.is_empty() {
        return CheckResult::pass(NAME, "No services configured for monitoring.");
    }
    let down: Vec<&str> = states
        .iter()
        .filter(|(_, state)| *state == ServiceState::Inactive)
        .map(|(name, _)| name.as_str())
        .collect();
    let unknown: Vec<(&str, &str)> = states
        .iter()
        .filter_map(|(name, state)| match state {
            ServiceState::Unknown(err) => Some((name.as_str(), err.as_str())),
            _ => None,
        })
        .collect();

    if down.is_empty() && unknown.is_empty() {
        return CheckResult::pass(NAME, "All monitored services are running.");
    }

    let mut parts = Vec::new();
    if !down.is_empty() {
        parts.push(format!("Services not running => [{}]", down.join(", ")));
    }
    if !unknown.is_empty() {
        let names: Vec<&str> = unknown.iter().map(|(name, _)| *name).collect();
        // identical errors are reported once
        let mut errors: Vec<&str> = unknown.iter().map(|(_, err)| *err).collect();
        errors.dedup();
        parts.push(format!(
            "state unknown => [{}] ({})",
            names.join(", "),
            errors.join("; ")
        ));
    }
    CheckResult::fail(NAME, parts.join("; "))
}
