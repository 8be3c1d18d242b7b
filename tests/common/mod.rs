#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use syspulse::error::{PulseError, Result};
use syspulse::probe::{CommandKind, CommandOutput, DiskRow, MemoryTotals, SystemProbe};

pub const ARCH_OS_RELEASE: &str = "NAME=\"Arch Linux\"\nID=arch\n";
pub const DEBIAN_OS_RELEASE: &str = "NAME=\"Debian GNU/Linux\"\nID=debian\n";
pub const FEDORA_OS_RELEASE: &str = "NAME=\"Fedora Linux\"\nID=fedora\n";

const GIB: u64 = 1024 * 1024 * 1024;

/// Scripted host. Commands that were not scripted fail as if the program
/// did not exist.
pub struct FakeProbe {
    pub disks: Vec<DiskRow>,
    pub disk_error: bool,
    pub memory: MemoryTotals,
    pub load: f64,
    pub active_services: Vec<String>,
    pub service_manager_missing: bool,
    tools: Mutex<HashSet<String>>,
    responses: HashMap<String, CommandOutput>,
    installs: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn healthy() -> Self {
        FakeProbe {
            disks: vec![DiskRow::new("/dev/sda1", "40%", "/")],
            disk_error: false,
            memory: MemoryTotals { used: 4 * GIB, total: 16 * GIB },
            load: 0.5,
            active_services: vec!["sshd".to_string(), "cron".to_string()],
            service_manager_missing: false,
            tools: Mutex::new(HashSet::new()),
            responses: HashMap::new(),
            installs: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tool(self, tool: &str) -> Self {
        self.tools.lock().unwrap().insert(tool.to_string());
        self.respond(tool, 0, "  /\\  fake distro art\n")
    }

    /// `command` is the program followed by its arguments, space separated.
    pub fn respond(mut self, command: &str, status: i32, stdout: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            CommandOutput {
                status: Some(status),
                stdout: stdout.to_string(),
                stderr: if status == 0 { String::new() } else { "E: simulated failure\n".to_string() },
            },
        );
        self
    }

    /// Running `command` successfully puts `tool` on PATH.
    pub fn installs(mut self, command: &str, tool: &str) -> Self {
        self.installs.insert(command.to_string(), tool.to_string());
        self.respond(command, 0, "")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SystemProbe for FakeProbe {
    async fn disk_usage(&self) -> Result<Vec<DiskRow>> {
        if self.disk_error {
            return Err(PulseError::Parse("df failed: exit status 1".to_string()));
        }
        Ok(self.disks.clone())
    }

    async fn memory(&self) -> Result<MemoryTotals> {
        Ok(self.memory)
    }

    async fn load_average(&self) -> Result<f64> {
        Ok(self.load)
    }

    async fn service_active(&self, name: &str) -> Result<bool> {
        if self.service_manager_missing {
            return Err(PulseError::Command {
                program: "systemctl".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            });
        }
        Ok(self.active_services.iter().any(|s| s == name))
    }

    fn tool_available(&self, tool: &str) -> bool {
        self.tools.lock().unwrap().contains(tool)
    }

    async fn run(&self, program: &str, args: &[&str], _kind: CommandKind) -> Result<CommandOutput> {
        let mut key = program.to_string();
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }
        self.calls.lock().unwrap().push(key.clone());

        let out = self.responses.get(&key).cloned().ok_or_else(|| PulseError::Command {
            program: program.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not scripted"),
        })?;
        if out.success() {
            if let Some(tool) = self.installs.get(&key) {
                self.tools.lock().unwrap().insert(tool.clone());
            }
        }
        Ok(out)
    }
}

pub fn os_release(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("os-release");
    std::fs::write(&path, contents).unwrap();
    path
}
