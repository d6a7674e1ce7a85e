use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;

/// Identity of a scanner. One scanner task exists per variant for the whole
/// lifetime of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    /// Hydra against the FTP default-credential list.
    Ftp,
    /// Hydra against SSH with the shared credential lists.
    Ssh,
    /// Gobuster directory brute force.
    DirBust,
    /// Wfuzz virtual host fuzzing.
    VhostFuzz,
    /// RID brute force followed by share enumeration.
    Kerberos,
    /// Nmap LDAP scripts followed by a base-level ldapsearch.
    Ldap,
    /// Netexec against WinRM with the shared credential lists.
    Winrm,
}

impl Protocol {
    pub const ALL: [Protocol; 7] = [
        Protocol::Ftp,
        Protocol::Ssh,
        Protocol::DirBust,
        Protocol::VhostFuzz,
        Protocol::Kerberos,
        Protocol::Ldap,
        Protocol::Winrm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Ssh => "ssh",
            Protocol::DirBust => "dirbust",
            Protocol::VhostFuzz => "vhost",
            Protocol::Kerberos => "kerberos",
            Protocol::Ldap => "ldap",
            Protocol::Winrm => "winrm",
        }
    }

    /// Whether the scanner feeds the subdomain discovery loop on completion.
    pub fn is_directory_scan(&self) -> bool {
        matches!(self, Protocol::DirBust)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ftp" => Ok(Protocol::Ftp),
            "ssh" => Ok(Protocol::Ssh),
            "dirbust" | "dir" | "gobuster" | "http" => Ok(Protocol::DirBust),
            "vhost" | "wfuzz" => Ok(Protocol::VhostFuzz),
            "kerberos" | "rid" | "smb" => Ok(Protocol::Kerberos),
            "ldap" => Ok(Protocol::Ldap),
            "winrm" => Ok(Protocol::Winrm),
            other => Err(ScanError::UnknownProtocol(other.to_string())),
        }
    }
}
