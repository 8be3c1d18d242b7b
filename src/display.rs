use colored::Colorize;
use serde::Serialize;

use crate::checks::CheckResult;
use crate::error::Result;
use crate::probe::{CommandKind, SystemProbe};
use crate::runner::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
  Tool,
  Generic,
}

/// Distribution art from `tool`, or the generic banner when the tool is
/// missing or fails to run.
pub async fn render_banner(probe: &dyn SystemProbe, tool: &str, tool_available: bool) -> (Banner, String) {
  if tool_available {
    match probe.run(tool, &[], CommandKind::Query).await {
      Ok(out) if out.success() => return (Banner::Tool, out.stdout),
      Ok(out) => tracing::debug!(tool, status = ?out.status, "banner tool failed"),
      Err(e) => tracing::debug!(tool, error = %e, "banner tool failed"),
    }
  }
  (Banner::Generic, generic_banner())
}

pub fn generic_banner() -> String {
  let rule = "=================================".cyan();
  format!(
    "{rule}\n{}\n{}\n{rule}\n",
    "        === SysPulse ===".bold().cyan(),
    "     host health check sweep".white()
  )
}

pub fn show_summary(results: &[CheckResult]) {
  println!("{}", "=== Summary ===".bold().cyan());
  for result in results {
    let status = if result.passed { "OK".green().bold() } else { "ACTION".red().bold() };
    println!("[{}] {}: {}", status, result.name.white(), result.detail);
  }
  let failed = results.iter().filter(|r| !r.passed).count();
  if failed == 0 {
    println!("{}", "All checks passed.".green());
  } else {
    println!("{}", format!("{failed} check(s) need attention.").yellow().bold());
  }
}

pub fn show_report(summary: &RunSummary) -> Result<()> {
  let report = serde_json::json!({
    "timestamp": chrono::Local::now().to_string(),
    "summary": summary,
  });
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
