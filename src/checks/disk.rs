use async_trait::async_trait;

use super::{Check, CheckContext, CheckResult};
use crate::probe::DiskRow;

pub const NAME: &str = "Disk Usage";

pub struct DiskUsage;

#[async_trait]
impl Check for DiskUsage {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> CheckResult {
        match ctx.probe.disk_usage().await {
            Ok(rows) => evaluate(&rows, ctx.config.thresholds.disk_usage_percent),
            Err(e) => CheckResult::fail(NAME, format!("Could not read disk usage ({e}).")),
        }
    }
}

/// Usage as a whole percentage. Rows that do not hold a non-negative
/// integer (header rows, `-`, garbage) yield `None` and are skipped.
fn usage_percent(raw: &str) -> Option<u32> {
    let digits = raw.trim().trim_end_matches('%');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn evaluate(rows: &[DiskRow], threshold: u8) -> CheckResult {
    let flagged: Vec<String> = rows
        .iter()
        .filter_map(|row| {
            let usage = usage_percent(&row.usage)?;
            (usage >= u32::from(threshold)).then(|| format!("{}({}%)", row.mount, usage))
        })
        .collect();

    if flagged.is_empty() {
        CheckResult::pass(
            NAME,
            format!("Disk usage is below {threshold}% on all mounts. No action needed."),
        )
    } else {
        CheckResult::fail(
            NAME,
            format!("High disk usage => {}. Consider freeing space.", flagged.join(" ")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_row_is_skipped() {
        let rows = vec![
            DiskRow::new("/dev/sda1", "55", "/"),
            DiskRow::new("/dev/sdb1", "95", "/data"),
            DiskRow::new("overlay", "abc", "/snap/x"),
        ];
        let result = evaluate(&rows, 80);
        assert!(!result.passed);
        assert_eq!(result.detail, "High disk usage => /data(95%). Consider freeing space.");
    }

    #[test]
    fn threshold_is_inclusive() {
        let rows = vec![DiskRow::new("/dev/sda1", "80%", "/")];
        assert!(!evaluate(&rows, 80).passed);
        assert!(evaluate(&rows, 81).passed);
    }

    #[test]
    fn all_clear() {
        let rows = vec![DiskRow::new("/dev/sda1", "12%", "/"), DiskRow::new("/dev/sda2", "-", "/home")];
        let result = evaluate(&rows, 80);
        assert!(result.passed);
        assert!(result.detail.contains("No action needed"));
    }

    #[test]
    fn rejects_signed_and_fractional_usage() {
        assert_eq!(usage_percent("-5"), None);
        assert_eq!(usage_percent("+5"), None);
        assert_eq!(usage_percent("9.5%"), None);
        assert_eq!(usage_percent("Use%"), None);
        assert_eq!(usage_percent(" 7% "), Some(7));
    }

    #[test]
    fn lists_every_flagged_mount() {
        let rows = vec![DiskRow::new("/dev/sda1", "91%", "/"), DiskRow::new("/dev/sdb1", "100%", "/srv")];
        let result = evaluate(&rows, 90);
        assert_eq!(result.detail, "High disk usage => /(91%) /srv(100%). Consider freeing space.");
    }
}
