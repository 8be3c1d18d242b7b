//! Package manager strategies, one per distribution family.

use async_trait::async_trait;
use serde::Serialize;

use crate::distro::Distribution;
use crate::error::{PulseError, Result};
use crate::probe::{CommandKind, SystemProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Count(usize),
    Unsupported,
}

#[async_trait]
pub trait PackageBackend: Send + Sync {
    /// Package manager name used in log lines.
    fn name(&self) -> &'static str;

    async fn attempt_install(&self, probe: &dyn SystemProbe, package: &str) -> Result<()>;

    /// Syncs the package index. Not called unless explicitly requested.
    async fn refresh_index(&self, probe: &dyn SystemProbe) -> Result<()>;

    async fn query_updates(&self, probe: &dyn SystemProbe) -> Result<UpdateStatus>;
}

pub fn backend_for(dist: Distribution) -> Box<dyn PackageBackend> {
    match dist {
        Distribution::ArchLike => Box::new(Pacman),
        Distribution::DebianLike => Box::new(Apt),
        Distribution::Other => Box::new(Unsupported),
    }
}

pub struct Pacman;

#[async_trait]
impl PackageBackend for Pacman {
    fn name(&self) -> &'static str {
        "pacman"
    }

    async fn attempt_install(&self, probe: &dyn SystemProbe, package: &str) -> Result<()> {
        checked(probe, "pacman", &["-Sy", "--noconfirm", package]).await
    }

    async fn refresh_index(&self, probe: &dyn SystemProbe) -> Result<()> {
        checked(probe, "pacman", &["-Sy"]).await
    }

    async fn query_updates(&self, probe: &dyn SystemProbe) -> Result<UpdateStatus> {
        let out = probe.run("pacman", &["-Qu"], CommandKind::Package).await?;
        // pacman -Qu exits 1 with no output when nothing is upgradable
        if out.success() || (out.status == Some(1) && out.stdout.trim().is_empty()) {
            return Ok(UpdateStatus::Count(count_pacman_updates(&out.stdout)));
        }
        Err(PulseError::Parse(format!("pacman -Qu: {}", out.failure_summary())))
    }
}

pub struct Apt;

#[async_trait]
impl PackageBackend for Apt {
    fn name(&self) -> &'static str {
        "apt-get"
    }

    async fn attempt_install(&self, probe: &dyn SystemProbe, package: &str) -> Result<()> {
        checked(probe, "apt-get", &["update"]).await?;
        checked(probe, "apt-get", &["install", "-y", package]).await
    }

    async fn refresh_index(&self, probe: &dyn SystemProbe) -> Result<()> {
        checked(probe, "apt-get", &["update"]).await
    }

    async fn query_updates(&self, probe: &dyn SystemProbe) -> Result<UpdateStatus> {
        let out = probe
            .run("apt-get", &["-s", "upgrade"], CommandKind::Package)
            .await?;
        if !out.success() {
            return Err(PulseError::Parse(format!(
                "apt-get -s upgrade: {}",
                out.failure_summary()
            )));
        }
        Ok(UpdateStatus::Count(count_apt_upgrades(&out.stdout)))
    }
}

pub struct Unsupported;

#[async_trait]
impl PackageBackend for Unsupported {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn attempt_install(&self, _probe: &dyn SystemProbe, _package: &str) -> Result<()> {
        Err(PulseError::Unsupported(Distribution::Other.to_string()))
    }

    async fn refresh_index(&self, _probe: &dyn SystemProbe) -> Result<()> {
        Err(PulseError::Unsupported(Distribution::Other.to_string()))
    }

    async fn query_updates(&self, _probe: &dyn SystemProbe) -> Result<UpdateStatus> {
        Ok(UpdateStatus::Unsupported)
    }
}

async fn checked(probe: &dyn SystemProbe, program: &str, args: &[&str]) -> Result<()> {
    let out = probe.run(program, args, CommandKind::Package).await?;
    if out.success() {
        Ok(())
    } else {
        Err(PulseError::Parse(format!(
            "{program} {}: {}",
            args.join(" "),
            out.failure_summary()
        )))
    }
}

pub fn count_pacman_updates(stdout: &str) -> usize {
    stdout.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Counts `Inst` lines of an `apt-get -s upgrade` simulation.
pub fn count_apt_upgrades(stdout: &str) -> usize {
    stdout.lines().filter(|l| l.starts_with("Inst ")).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacman_counts_lines() {
        let out = "linux 6.9.1.arch1-1 -> 6.9.2.arch1-1\nmesa 1:24.1.0-1 -> 1:24.1.1-1\n\n";
        assert_eq!(count_pacman_updates(out), 2);
        assert_eq!(count_pacman_updates(""), 0);
    }

    #[test]
    fn apt_counts_inst_lines_only() {
        let out = "\
Reading package lists...
Building dependency tree...
The following packages will be upgraded:
  curl libcurl4
2 upgraded, 0 newly installed, 0 to remove and 0 not upgraded.
Inst curl [7.88.1-10] (7.88.1-10+deb12u5 Debian-Security:12/stable-security [amd64])
Inst libcurl4 [7.88.1-10] (7.88.1-10+deb12u5 Debian-Security:12/stable-security [amd64])
Conf curl (7.88.1-10+deb12u5 Debian-Security:12/stable-security [amd64])
";
        assert_eq!(count_apt_upgrades(out), 2);
    }

    #[test]
    fn backend_selection() {
        assert_eq!(backend_for(Distribution::ArchLike).name(), "pacman");
        assert_eq!(backend_for(Distribution::DebianLike).name(), "apt-get");
        assert_eq!(backend_for(Distribution::Other).name(), "none");
    }
}
