//! Credential brute-force output (hydra and netexec).

use std::net::IpAddr;
use std::sync::LazyLock;

use huntr_common::events::{Credential, Signal};
use huntr_common::process::OutputLine;
use huntr_common::protocol::Protocol;
use regex::Regex;

use crate::{Interpreter, strip_ansi};

static HYDRA_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"login:\s+(\S+)\s+password:\s+(\S+)").expect("static regex")
});
static NETEXEC_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\+\]\s+[\w.\-]+\\([\w.\-]+):(.+?)\s+\(Pwn3d!\)").expect("static regex")
});

/// Python deprecation chatter printed by netexec on every run.
const BENIGN_STDERR: &[&str] = &[
    "CryptographyDeprecationWarning",
    "arc4 = algorithms.ARC4(self._key)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFormat {
    Hydra,
    Netexec,
}

pub struct CredentialInterpreter {
    service: Protocol,
    format: CredentialFormat,
    ip: IpAddr,
    found: Vec<Credential>,
}

impl CredentialInterpreter {
    pub fn new(service: Protocol, format: CredentialFormat, ip: IpAddr) -> Self {
        Self {
            service,
            format,
            ip,
            found: Vec::new(),
        }
    }

    fn extract(&self, text: &str) -> Option<Credential> {
        let caps = match self.format {
            CredentialFormat::Hydra => HYDRA_HIT.captures(text)?,
            CredentialFormat::Netexec => NETEXEC_HIT.captures(text)?,
        };
        Some(Credential {
            username: caps[1].to_string(),
            password: caps[2].to_string(),
            service: self.service,
        })
    }

    /// How to use a credential right away, for services with an obvious
    /// client.
    fn connection_hint(&self, cred: &Credential) -> Option<String> {
        match self.service {
            Protocol::Ssh => Some(format!("Connect with: ssh {}@{}", cred.username, self.ip)),
            Protocol::Winrm => Some(format!(
                "Connect with: evil-winrm -i {} -u '{}' -p '{}'",
                self.ip, cred.username, cred.password
            )),
            _ => None,
        }
    }
}

impl Interpreter for CredentialInterpreter {
    fn feed(&mut self, line: &OutputLine) -> Vec<Signal> {
        let cleaned = strip_ansi(&line.text);
        let text = cleaned.trim();
        if text.is_empty() {
            return Vec::new();
        }

        if line.is_stderr() {
            if BENIGN_STDERR.iter().any(|marker| text.contains(marker)) {
                return Vec::new();
            }
            return vec![Signal::Error(text.to_string())];
        }

        let mut signals = vec![Signal::Display(text.to_string())];
        let Some(cred) = self.extract(text) else {
            return signals;
        };

        signals.push(Signal::Display(format!(
            "Valid credentials: {}:{}",
            cred.username, cred.password
        )));
        if let Some(hint) = self.connection_hint(&cred) {
            signals.push(Signal::Display(hint));
        }
        self.found.push(cred.clone());
        signals.push(Signal::CredentialFound(cred));
        signals
    }

    fn finish(&mut self) -> Vec<Signal> {
        let summary = self
            .found
            .iter()
            .map(|c| format!("{}:{}", c.username, c.password))
            .collect();
        vec![
            Signal::Display("Scan completed.".into()),
            Signal::ScanComplete(summary),
        ]
    }
}
