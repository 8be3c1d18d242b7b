//! syspulse: a single-host health check sweep (disk, memory, load,
//! services, pending updates) with a plain-text run log, plus an
//! interactive directory backup tool.

pub mod backup;
pub mod checks;
pub mod cli;
pub mod config;
pub mod display;
pub mod distro;
pub mod error;
pub mod installer;
pub mod logger;
pub mod package;
pub mod probe;
pub mod prompt;
pub mod runner;

pub use config::Config;
pub use error::{PulseError, Result};
