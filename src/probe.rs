//! Access to the host: every external command and kernel file the checks
//! read goes through [`SystemProbe`], so a fixture can stand in for the host.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{System, SystemExt};
use tokio::process::Command;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::{PulseError, Result};

pub const LOADAVG: &str = "/proc/loadavg";

/// Selects which timeout applies to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Query,
    Package,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Short description of a failed run for log lines.
    pub fn failure_summary(&self) -> String {
        let code = self
            .status
            .map(|c| format!("exit status {c}"))
            .unwrap_or_else(|| "terminated by signal".to_string());
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => format!("{code}: {}", line.trim()),
            None => code,
        }
    }
}

/// One device-backed row of the filesystem usage query. `usage` is kept
/// raw so that malformed values can be skipped by the disk check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskRow {
    pub source: String,
    pub usage: String,
    pub mount: String,
}

impl DiskRow {
    pub fn new(source: &str, usage: &str, mount: &str) -> Self {
        DiskRow {
            source: source.to_string(),
            usage: usage.to_string(),
            mount: mount.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTotals {
    pub used: u64,
    pub total: u64,
}

#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn disk_usage(&self) -> Result<Vec<DiskRow>>;
    async fn memory(&self) -> Result<MemoryTotals>;
    /// One-minute load average.
    async fn load_average(&self) -> Result<f64>;
    async fn service_active(&self, name: &str) -> Result<bool>;
    fn tool_available(&self, tool: &str) -> bool;
    async fn run(&self, program: &str, args: &[&str], kind: CommandKind) -> Result<CommandOutput>;
}

pub struct HostProbe {
    command_timeout: Duration,
    package_timeout: Duration,
}

impl HostProbe {
    pub fn new(config: &ProbeConfig) -> Self {
        HostProbe {
            command_timeout: Duration::from_secs(config.command_timeout_secs),
            package_timeout: Duration::from_secs(config.package_timeout_secs),
        }
    }
}

#[async_trait]
impl SystemProbe for HostProbe {
    async fn disk_usage(&self) -> Result<Vec<DiskRow>> {
        let out = self.run("df", &["-P"], CommandKind::Query).await?;
        // df exits non-zero when a single mount is unreadable but still
        // prints the rest
        if !out.success() && out.stdout.trim().is_empty() {
            return Err(PulseError::Parse(format!("df failed: {}", out.failure_summary())));
        }
        Ok(parse_df(&out.stdout))
    }

    async fn memory(&self) -> Result<MemoryTotals> {
        let mut sys = System::new();
        sys.refresh_memory();
        Ok(MemoryTotals {
            used: sys.used_memory(),
            total: sys.total_memory(),
        })
    }

    async fn load_average(&self) -> Result<f64> {
        let text = tokio::fs::read_to_string(LOADAVG)
            .await
            .map_err(|e| PulseError::io(LOADAVG, e))?;
        parse_loadavg(&text)
    }

    async fn service_active(&self, name: &str) -> Result<bool> {
        let out = self
            .run("systemctl", &["is-active", "--quiet", name], CommandKind::Query)
            .await?;
        Ok(out.success())
    }

    fn tool_available(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }

    async fn run(&self, program: &str, args: &[&str], kind: CommandKind) -> Result<CommandOutput> {
        let limit = match kind {
            CommandKind::Query => self.command_timeout,
            CommandKind::Package => self.package_timeout,
        };
        debug!(program, ?args, timeout_secs = limit.as_secs(), "running command");

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        match tokio::time::timeout(limit, cmd.output()).await {
            Err(_) => Err(PulseError::Timeout {
                program: program.to_string(),
                secs: limit.as_secs(),
            }),
            Ok(Err(source)) => Err(PulseError::Command {
                program: program.to_string(),
                source,
            }),
            Ok(Ok(output)) => Ok(CommandOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }
}

/// Parses POSIX `df -P` output, keeping only `/dev/` backed filesystems.
pub fn parse_df(text: &str) -> Vec<DiskRow> {
    text.lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 || !cols[0].starts_with("/dev/") {
                return None;
            }
            Some(DiskRow {
                source: cols[0].to_string(),
                usage: cols[4].to_string(),
                // mount points may contain spaces
                mount: cols[5..].join(" "),
            })
        })
        .collect()
}

pub fn parse_loadavg(text: &str) -> Result<f64> {
    let first = text
        .split_whitespace()
        .next()
        .ok_or_else(|| PulseError::Parse("empty load average".to_string()))?;
    first
        .parse::<f64>()
        .map_err(|e| PulseError::Parse(format!("load average {first:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DF: &str = "\
Filesystem     1024-blocks      Used Available Capacity Mounted on
/dev/nvme0n1p2   490617784 201356812 264243592      44% /
tmpfs             16314664      1024  16313640       1% /tmp
/dev/nvme0n1p1     1046512    312244    734268      30% /boot
/dev/sdb1        960302804 912302804  48000000      95% /mnt/backup disk
";

    #[test]
    fn df_keeps_device_rows() {
        let rows = parse_df(DF);
        assert_eq!(
            rows,
            vec![
                DiskRow::new("/dev/nvme0n1p2", "44%", "/"),
                DiskRow::new("/dev/nvme0n1p1", "30%", "/boot"),
                DiskRow::new("/dev/sdb1", "95%", "/mnt/backup disk"),
            ]
        );
    }

    #[test]
    fn df_ignores_short_lines() {
        assert!(parse_df("/dev/sda1 10 5\n\n").is_empty());
    }

    #[test]
    fn loadavg_first_field() {
        let load = parse_loadavg("0.52 0.58 0.59 1/1032 48211\n").unwrap();
        assert!((load - 0.52).abs() < f64::EPSILON);
    }

    #[test]
    fn loadavg_garbage() {
        assert!(parse_loadavg("").is_err());
        assert!(parse_loadavg("abc 1 2").is_err());
    }

    #[test]
    fn failure_summary_uses_last_stderr_line() {
        let out = CommandOutput {
            status: Some(100),
            stdout: String::new(),
            stderr: "Reading package lists...\nE: Could not open lock file\n".to_string(),
        };
        assert_eq!(out.failure_summary(), "exit status 100: E: Could not open lock file");
        assert!(!out.success());
    }

    #[tokio::test]
    async fn host_probe_runs_commands() {
        let probe = HostProbe::new(&ProbeConfig::default());
        let out = probe.run("sh", &["-c", "echo hi"], CommandKind::Query).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hi");
    }

    #[tokio::test]
    async fn host_probe_times_out() {
        let probe = HostProbe::new(&ProbeConfig {
            command_timeout_secs: 1,
            package_timeout_secs: 1,
        });
        let err = probe.run("sleep", &["5"], CommandKind::Query).await.unwrap_err();
        assert!(matches!(err, PulseError::Timeout { secs: 1, .. }));
    }

    #[tokio::test]
    async fn missing_program_is_command_error() {
        let probe = HostProbe::new(&ProbeConfig::default());
        let err = probe
            .run("definitely-not-a-real-binary-xyz", &[], CommandKind::Query)
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Command { .. }));
    }
}
