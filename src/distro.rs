use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

pub const OS_RELEASE: &str = "/etc/os-release";

const ARCH_IDS: &[&str] = &["arch", "archarm", "manjaro", "endeavouros", "garuda", "artix"];
const DEBIAN_IDS: &[&str] = &[
    "debian",
    "ubuntu",
    "linuxmint",
    "pop",
    "raspbian",
    "kali",
    "elementary",
    "zorin",
];

/// Coarse distribution family, decides which package manager is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    ArchLike,
    DebianLike,
    Other,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Distribution::ArchLike => "arch-like",
            Distribution::DebianLike => "debian-like",
            Distribution::Other => "other",
        })
    }
}

pub fn detect() -> Distribution {
    detect_from(Path::new(OS_RELEASE))
}

pub fn detect_from(path: &Path) -> Distribution {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_os_release(&contents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "os-release unreadable");
            Distribution::Other
        }
    }
}

/// Maps `ID`, falling back to the tokens of `ID_LIKE`.
pub fn parse_os_release(contents: &str) -> Distribution {
    let id = field(contents, "ID");
    if let Some(dist) = id.as_deref().and_then(classify) {
        return dist;
    }
    field(contents, "ID_LIKE")
        .and_then(|like| like.split_whitespace().find_map(classify))
        .unwrap_or(Distribution::Other)
}

fn classify(id: &str) -> Option<Distribution> {
    if ARCH_IDS.contains(&id) {
        Some(Distribution::ArchLike)
    } else if DEBIAN_IDS.contains(&id) {
        Some(Distribution::DebianLike)
    } else {
        None
    }
}

fn field(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let value = v.trim().trim_matches(|c| c == '"' || c == '\'');
        Some(value.to_ascii_lowercase())
    })
}
