//! # Scan Target Model
//!
//! Two shapes of target exist:
//!
//! * [`ScanInput`]: whatever the user typed for host discovery. It may be an
//!   IP address or a hostname and is passed verbatim to the discovery tool.
//! * [`Target`]: the resolved address used by every protocol scanner. Its
//!   domain is decided once per session and never changes afterwards.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::ScanError;

const MAX_NAME_LEN: usize = 253;

/// A resolved scan target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    ip: IpAddr,
    domain: Option<String>,
}

impl Target {
    pub fn new(ip: IpAddr) -> Self {
        Self { ip, domain: None }
    }

    /// Builds a target addressed by name, validating the name first.
    pub fn with_domain(ip: IpAddr, domain: &str) -> Result<Self, ScanError> {
        let domain = parse_hostname(domain)?;
        Ok(Self {
            ip,
            domain: Some(domain),
        })
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// The name HTTP-family scanners should address: the domain when known,
    /// otherwise the IP.
    pub fn host(&self) -> String {
        match &self.domain {
            Some(domain) => domain.clone(),
            None => self.ip.to_string(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{domain} ({})", self.ip),
            None => write!(f, "{}", self.ip),
        }
    }
}

/// The raw target handed to host discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanInput {
    Address(IpAddr),
    Hostname(String),
}

impl ScanInput {
    pub fn as_arg(&self) -> String {
        match self {
            ScanInput::Address(ip) => ip.to_string(),
            ScanInput::Hostname(name) => name.clone(),
        }
    }

    pub fn address(&self) -> Option<IpAddr> {
        match self {
            ScanInput::Address(ip) => Some(*ip),
            ScanInput::Hostname(_) => None,
        }
    }
}

impl FromStr for ScanInput {
    type Err = ScanError;

    /// Parses a discovery target.
    ///
    /// Supported formats:
    /// * **Host**: single IPv4/IPv6 address (e.g. "10.10.11.5").
    /// * **Name**: a DNS name (e.g. "board.htb").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ScanError::invalid_target(s, "target is empty"));
        }

        if let Some(ip) = parse_host(s) {
            return Ok(ScanInput::Address(ip));
        }

        parse_hostname(s).map(ScanInput::Hostname)
    }
}

impl fmt::Display for ScanInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_arg())
    }
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Option<IpAddr> {
    s.parse::<IpAddr>().ok()
}

/// Validates a DNS name. Names end up in argument vectors, so anything that
/// could be read as an option or carries whitespace is rejected.
pub fn parse_hostname(s: &str) -> Result<String, ScanError> {
    let name = s.trim().trim_end_matches('.');

    if name.is_empty() {
        return Err(ScanError::invalid_target(s, "name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ScanError::invalid_target(s, "name is too long"));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(ScanError::invalid_target(s, "empty label"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(ScanError::invalid_target(s, "label starts or ends with '-'"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ScanError::invalid_target(s, "invalid character in name"));
        }
    }

    Ok(name.to_ascii_lowercase())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
