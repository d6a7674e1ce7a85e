//! File-backed [`HostResolver`] over a `/etc/hosts` style store.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use huntr_common::error::ScanError;
use huntr_common::hosts::{HostResolver, dot_count, parse_line};
use huntr_common::target::parse_hostname;
use tracing::{debug, warn};

/// Wraps the privileged helper run, which may prompt on the terminal.
pub type PromptGuard = Arc<dyn Fn(&mut dyn FnMut()) + Send + Sync>;

pub struct HostsFile {
    path: PathBuf,
    /// Program used to swap a staged copy into place when appending is
    /// denied.
    privileged_helper: String,
    prompt_guard: Option<PromptGuard>,
    write_lock: Mutex<()>,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>, privileged_helper: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            privileged_helper: privileged_helper.into(),
            prompt_guard: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_prompt_guard(mut self, guard: PromptGuard) -> Self {
        self.prompt_guard = Some(guard);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    fn append(&self, existing: &str, entry: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.write_all(entry.as_bytes())
    }

    /// Writes the full new content to a temporary file and installs it over
    /// the store with the privileged helper.
    fn privileged_append(&self, existing: &str, entry: &str) -> Result<(), ScanError> {
        let fail = |reason: String| ScanError::ResolverWrite {
            path: self.path.clone(),
            reason,
        };

        let mut content = existing.to_string();
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(entry);

        let mut staged = tempfile::NamedTempFile::new().map_err(|e| fail(e.to_string()))?;
        staged
            .write_all(content.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| fail(e.to_string()))?;

        debug!(helper = %self.privileged_helper, "installing staged hosts file");
        let status = self
            .install(staged.path())
            .map_err(|e| fail(format!("{}: {e}", self.privileged_helper)))?;

        if !status.success() {
            return Err(fail(format!("{} exited with {status}", self.privileged_helper)));
        }
        Ok(())
    }

    fn install(&self, staged: &Path) -> io::Result<ExitStatus> {
        let mut result = None;
        let mut run = || {
            result = Some(
                Command::new(&self.privileged_helper)
                    .arg("install")
                    .args(["-m", "644"])
                    .arg(staged)
                    .arg(&self.path)
                    .status(),
            );
        };
        match &self.prompt_guard {
            Some(guard) => guard(&mut run),
            None => run(),
        }
        result.unwrap_or_else(|| Err(io::Error::other("privileged helper was not run")))
    }
}

impl HostResolver for HostsFile {
    fn lookup(&self, ip: IpAddr) -> anyhow::Result<Option<String>> {
        let content = self.read()?;
        let domain = content
            .lines()
            .filter_map(parse_line)
            .filter(|(addr, _)| *addr == ip)
            .flat_map(|(_, names)| names)
            .find(|name| dot_count(name) == 1)
            .map(str::to_string);
        Ok(domain)
    }

    fn names_for(&self, ip: IpAddr) -> anyhow::Result<Vec<String>> {
        let content = self.read()?;
        let mut names: Vec<String> = Vec::new();
        for (addr, line_names) in content.lines().filter_map(parse_line) {
            if addr != ip {
                continue;
            }
            for name in line_names {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn contains(&self, name: &str) -> anyhow::Result<bool> {
        let content = self.read()?;
        Ok(content
            .lines()
            .filter_map(parse_line)
            .any(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(name))))
    }

    fn add_entry(&self, ip: IpAddr, name: &str) -> anyhow::Result<bool> {
        let name = parse_hostname(name)?;
        let name = name.as_str();
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("hosts file lock poisoned"))?;

        let existing = self.read()?;
        let present = existing
            .lines()
            .filter_map(parse_line)
            .any(|(addr, names)| addr == ip && names.iter().any(|n| n.eq_ignore_ascii_case(name)));
        if present {
            debug!(%ip, name, "hosts entry already present");
            return Ok(false);
        }

        let entry = format!("{ip} {name}\n");
        match self.append(&existing, &entry) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                warn!("No write access to {}, retrying with {}", self.path.display(), self.privileged_helper);
                self.privileged_append(&existing, &entry)?;
                Ok(true)
            }
            Err(e) => Err(ScanError::ResolverWrite {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
