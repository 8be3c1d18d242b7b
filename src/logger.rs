//! Run log: timestamped lines echoed to stdout and appended to a file.
//!
//! Writing is best effort. A failed write is reported on stderr and the
//! entry is still kept in memory, so the end-of-run dump can fall back to
//! console-only output.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::warn;

use crate::error::{PulseError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp.format(TIMESTAMP_FORMAT), self.message)
    }
}

pub struct RunLog {
    path: PathBuf,
    echo: bool,
    entries: Vec<LogEntry>,
    write_failed: bool,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RunLog {
            path: path.into(),
            echo: true,
            entries: Vec::new(),
            write_failed: false,
        }
    }

    /// Same as `new` but nothing is printed while logging.
    pub fn quiet(path: impl Into<PathBuf>) -> Self {
        RunLog {
            echo: false,
            ..RunLog::new(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncates the log file. Call once, before the first `log`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.write_failed = false;
        if let Err(e) = truncate(&self.path) {
            self.report_failure(&e);
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now().naive_local(),
            message: message.into(),
        };
        if self.echo {
            println!("{entry}");
        }
        if let Err(e) = append(&self.path, &entry) {
            self.report_failure(&e);
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// False once any truncate or append on the file has failed.
    pub fn is_persisted(&self) -> bool {
        !self.write_failed
    }

    /// Full text of the log file as written this run.
    pub fn contents(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| PulseError::io(&self.path, e))
    }

    /// Text for the end-of-run dump: the file when it is intact, the
    /// in-memory entries otherwise.
    pub fn transcript(&self) -> String {
        if self.is_persisted() {
            if let Ok(text) = self.contents() {
                return text;
            }
        }
        self.entries.iter().map(|e| format!("{e}\n")).collect()
    }

    fn report_failure(&mut self, err: &PulseError) {
        self.write_failed = true;
        warn!(error = %err, "run log write failed");
        eprintln!("syspulse: cannot write log file: {err}");
    }
}

fn truncate(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PulseError::io(parent, e))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| PulseError::io(path, e))?;
    Ok(())
}

fn append(path: &Path, entry: &LogEntry) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| PulseError::io(path, e))?;
    writeln!(file, "{entry}").map_err(|e| PulseError::io(path, e))
}
