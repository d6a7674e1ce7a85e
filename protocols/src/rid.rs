//! Identity enumeration: a RID brute force followed by a share crawl.

use std::net::IpAddr;

use huntr_common::events::Signal;
use huntr_common::process::OutputLine;

use crate::{Interpreter, strip_ansi};

/// The enumeration tool is a Python program; a missing module means it
/// cannot run at all.
const MISSING_MODULE: &str = "ModuleNotFoundError";

/// Account names from `DOMAIN\name (SidTypeUser)` style lines, first
/// occurrence order, without duplicates.
pub fn extract_accounts(lines: &[String]) -> Vec<String> {
    let mut accounts: Vec<String> = Vec::new();
    for line in lines {
        if !(line.contains("SidTypeUser") || line.contains("SidTypeGroup")) {
            continue;
        }
        let parts: Vec<&str> = line.split('\\').collect();
        if parts.len() != 2 {
            continue;
        }
        let Some(name) = parts[1].split_whitespace().next() else {
            continue;
        };
        if !accounts.iter().any(|a| a == name) {
            accounts.push(name.to_string());
        }
    }
    accounts
}

pub struct IdentityInterpreter {
    ip: IpAddr,
    stage: usize,
    enumeration: Vec<String>,
    collected: Vec<String>,
}

impl IdentityInterpreter {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            stage: 0,
            enumeration: Vec::new(),
            collected: Vec::new(),
        }
    }
}

impl Interpreter for IdentityInterpreter {
    fn begin_stage(&mut self, stage: usize) {
        self.stage = stage;
    }

    fn feed(&mut self, line: &OutputLine) -> Vec<Signal> {
        let text = strip_ansi(&line.text).trim_end().to_string();
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.collected.push(text.clone());

        if self.stage == 0 {
            self.enumeration.push(text);
            return Vec::new();
        }
        if line.is_stderr() {
            vec![Signal::Error(text)]
        } else {
            vec![Signal::Display(text)]
        }
    }

    fn end_stage(&mut self, stage: usize) -> Vec<Signal> {
        if stage != 0 {
            return Vec::new();
        }

        if self.enumeration.iter().any(|l| l.contains(MISSING_MODULE)) {
            let reason = "RID enumeration tool is missing a Python module".to_string();
            return vec![
                Signal::Error(format!("Error: {reason}")),
                Signal::Halt(reason),
            ];
        }

        let accounts = extract_accounts(&self.enumeration);
        let mut signals = Vec::new();
        if accounts.is_empty() {
            signals.push(Signal::Display("No valid usernames found in the output.".into()));
        } else {
            signals.push(Signal::Display(format!(
                "Found {} usernames: {}",
                accounts.len(),
                accounts.join(", ")
            )));
            signals.push(Signal::UsersFound(accounts));
        }
        signals.push(Signal::Display(format!(
            "Running share enumeration on {}...",
            self.ip
        )));
        signals
    }

    fn finish(&mut self) -> Vec<Signal> {
        vec![Signal::ScanComplete(std::mem::take(&mut self.collected))]
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
