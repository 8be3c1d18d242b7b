//! Interactive backup of chosen directories into one timestamped
//! `.tar.gz` bundle.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::error::{PulseError, Result};
use crate::prompt;

#[derive(Debug, Clone)]
pub struct BackupRequest {
  pub dirs: Vec<String>,
  pub destination: String,
  pub assume_yes: bool,
}

pub fn run(req: &BackupRequest) -> Result<PathBuf> {
  let raw: Vec<String> = if req.dirs.is_empty() {
    prompt::ask("Directories to back up (space separated): ")?
      .split_whitespace()
      .map(String::from)
      .collect()
  } else {
    req.dirs.clone()
  };

  let (dirs, rejected) = resolve_dirs(&raw);
  for (entry, reason) in &rejected {
    println!("{} {} ({})", "Skipping".yellow(), entry, reason);
  }
  if dirs.is_empty() {
    return Err(PulseError::Backup("no valid directories to back up".to_string()));
  }

  let dest_dir = prepare_destination(&expand_path(&req.destination)?, &dirs)?;
  let archive = dest_dir.join(archive_name(Local::now().naive_local()));

  println!("{}", "=== Backup plan ===".bold().cyan());
  for dir in &dirs {
    println!("  {}", dir.display().to_string().blue());
  }
  println!("Archive: {}", archive.display().to_string().white());

  if !req.assume_yes && !prompt::confirm("Proceed? [y/N]: ")? {
    return Err(PulseError::Cancelled);
  }

  let progress = spinner();
  let result = create_archive(&dirs, &archive, &progress);
  progress.finish_and_clear();
  let size = result?;

  info!(archive = %archive.display(), size, "backup written");
  println!("{} {} ({})", "Backup saved!".green(), archive.display(), human_size(size));
  Ok(archive)
}

/// Expands `~` and environment variables.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(PulseError::Backup("empty path".to_string()));
  }
  let expanded = shellexpand::full(trimmed).map_err(|e| PulseError::Backup(format!("{trimmed}: {e}")))?;
  Ok(PathBuf::from(expanded.as_ref()))
}

/// Splits entries into existing directories (canonicalized, first
/// occurrence kept) and rejected entries with a reason.
pub fn resolve_dirs(raw: &[String]) -> (Vec<PathBuf>, Vec<(String, String)>) {
  let mut dirs: Vec<PathBuf> = Vec::new();
  let mut rejected = Vec::new();

  for entry in raw {
    let path = match expand_path(entry) {
      Ok(p) => p,
      Err(e) => {
        rejected.push((entry.clone(), e.to_string()));
        continue;
      }
    };
    if !path.is_dir() {
      let reason = if path.exists() { "not a directory" } else { "does not exist" };
      rejected.push((entry.clone(), reason.to_string()));
      continue;
    }
    match path.canonicalize() {
      Ok(abs) if !dirs.contains(&abs) => dirs.push(abs),
      Ok(_) => debug!(entry = %entry, "duplicate directory ignored"),
      Err(e) => rejected.push((entry.clone(), e.to_string())),
    }
  }
  (dirs, rejected)
}

pub fn archive_name(at: NaiveDateTime) -> String {
  format!("backup_{}.tar.gz", at.format("%Y%m%d_%H%M%S"))
}

/// Creates the destination and refuses it when it resolves to a place
/// inside one of the directories being archived. Returns the resolved path.
fn prepare_destination(dest: &Path, dirs: &[PathBuf]) -> Result<PathBuf> {
  let existed = dest.exists();
  fs::create_dir_all(dest).map_err(|e| PulseError::io(dest, e))?;
  let dest_abs = dest.canonicalize().map_err(|e| PulseError::io(dest, e))?;

  match dirs.iter().find(|dir| dest_abs.starts_with(dir)) {
    Some(dir) => {
      if !existed {
        let _ = fs::remove_dir(&dest_abs);
      }
      Err(PulseError::Backup(format!(
        "destination {} lies inside {}",
        dest_abs.display(),
        dir.display()
      )))
    }
    None => Ok(dest_abs),
  }
}

/// Top-level archive entry per directory: its last component, suffixed
/// when two directories share one.
pub fn entry_names(dirs: &[PathBuf]) -> Vec<String> {
  let mut seen: HashMap<String, usize> = HashMap::new();
  dirs
    .iter()
    .map(|dir| {
      let base = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
      let count = seen.entry(base.clone()).or_insert(0);
      *count += 1;
      if *count == 1 { base } else { format!("{}_{}", base, count) }
    })
    .collect()
}

pub fn create_archive(dirs: &[PathBuf], archive: &Path, progress: &ProgressBar) -> Result<u64> {
  let written = write_archive(dirs, archive, progress);
  if written.is_err() {
    let _ = fs::remove_file(archive);
  }
  written?;
  let meta = fs::metadata(archive).map_err(|e| PulseError::io(archive, e))?;
  Ok(meta.len())
}

fn write_archive(dirs: &[PathBuf], archive: &Path, progress: &ProgressBar) -> Result<()> {
  let file = File::create(archive).map_err(|e| PulseError::io(archive, e))?;
  let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
  builder.follow_symlinks(false);

  for (dir, name) in dirs.iter().zip(entry_names(dirs)) {
    progress.set_message(format!("Archiving {}", dir.display()));
    builder.append_dir_all(&name, dir).map_err(|e| PulseError::io(dir, e))?;
  }

  let encoder = builder.into_inner().map_err(|e| PulseError::io(archive, e))?;
  encoder.finish().map_err(|e| PulseError::io(archive, e))?;
  Ok(())
}

fn spinner() -> ProgressBar {
  if !io::stdout().is_terminal() {
    return ProgressBar::hidden();
  }
  let pb = ProgressBar::new_spinner();
  let style = ProgressStyle::default_spinner()
    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    .template("{spinner:.cyan} {msg}")
    .unwrap_or_else(|_| ProgressStyle::default_spinner());
  pb.set_style(style);
  pb.enable_steady_tick(Duration::from_millis(100));
  pb
}

fn human_size(bytes: u64) -> String {
  if bytes >= 1024 * 1024 {
    format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
  } else if bytes >= 1024 {
    format!("{:.1} KB", bytes as f64 / 1024.0)
  } else {
    format!("{} B", bytes)
  }
}
