use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "syspulse", version, about = "Host health check sweep and directory backup tool")]
pub struct Cli {
  /// Configuration file (TOML); defaults to ~/.config/syspulse/config.toml when present
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  /// Verbose diagnostics on stderr
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
  /// Run disk, memory, load, service and update checks once
  Check(CheckArgs),

  /// Archive directories into a timestamped .tar.gz bundle
  Backup {
    /// Directories to back up; asked interactively when omitted
    dirs: Vec<String>,
    /// Where the archive is written
    #[arg(short, long)]
    dest: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
  },
}

#[derive(Args)]
pub struct CheckArgs {
  #[arg(long)]
  pub log_file: Option<PathBuf>,
  #[arg(long)]
  pub disk_threshold: Option<u8>,
  #[arg(long)]
  pub memory_threshold: Option<u8>,
  #[arg(long)]
  pub load_threshold: Option<f64>,
  /// Service to monitor (repeatable); replaces the configured list
  #[arg(long = "service")]
  pub services: Vec<String>,
  /// Never try to install the banner tool
  #[arg(long)]
  pub no_install: bool,
  /// Refresh the package index before counting updates
  #[arg(long)]
  pub refresh_index: bool,
  /// Print a JSON report instead of the log transcript
  #[arg(long)]
  pub json: bool,
  /// Exit with status 1 when any check needs attention
  #[arg(long)]
  pub strict: bool,
}

impl CheckArgs {
  pub fn apply(&self, config: &mut Config) {
    if let Some(path) = &self.log_file {
      config.log_path = path.clone();
    }
    if let Some(v) = self.disk_threshold {
      config.thresholds.disk_usage_percent = v;
    }
    if let Some(v) = self.memory_threshold {
      config.thresholds.memory_usage_percent = v;
    }
    if let Some(v) = self.load_threshold {
      config.thresholds.load_average = v;
    }
    if !self.services.is_empty() {
      config.thresholds.monitored_services = self.services.clone();
    }
    if self.no_install {
      config.display.install = false;
    }
    if self.refresh_index {
      config.updates.refresh_index = true;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn overrides_replace_config_values() {
    let cli = Cli::parse_from([
      "syspulse", "check", "--disk-threshold", "90", "--load-threshold", "3.5",
      "--service", "nginx", "--service", "sshd", "--no-install",
    ]);
    let Commands::Check(args) = cli.command else { panic!("expected check") };

    let mut config = Config::default();
    args.apply(&mut config);
    assert_eq!(config.thresholds.disk_usage_percent, 90);
    assert_eq!(config.thresholds.load_average, 3.5);
    assert_eq!(config.thresholds.monitored_services, vec!["nginx", "sshd"]);
    assert!(!config.display.install);
    assert_eq!(config.thresholds.memory_usage_percent, 80);
  }

  #[test]
  fn backup_takes_dirs() {
    let cli = Cli::parse_from(["syspulse", "backup", "~/docs", "/etc", "--yes"]);
    match cli.command {
      Commands::Backup { dirs, dest, yes } => {
        assert_eq!(dirs, vec!["~/docs", "/etc"]);
        assert!(dest.is_none());
        assert!(yes);
      }
      _ => panic!("expected backup"),
    }
  }
}
