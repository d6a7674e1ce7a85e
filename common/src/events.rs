//! Typed events flowing out of scanners.
//!
//! Interpreters turn raw tool output into [`Signal`]s. Scanner tasks wrap
//! them into [`ScanEvent`]s tagged with their protocol and push them down a
//! single channel; the orchestrator and the presentation layer consume them.

use std::fmt;
use std::net::IpAddr;

use crate::protocol::Protocol;
use crate::target::Target;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub service: Protocol,
}

/// A response shape reported by a directory scan whose status code matches
/// every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Noise {
    pub status_code: Option<u16>,
    pub length: u64,
}

/// One parsed virtual host fuzzing result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzHit {
    pub status_code: u16,
    pub lines: u32,
    pub words: u32,
    pub chars: u32,
    pub label: String,
}

impl fmt::Display for FuzzHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} \"{}\"", self.status_code, self.words, self.label)
    }
}

/// The most frequent `(status, words)` pair of a fuzzing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Baseline {
    pub status_code: u16,
    pub words: u32,
    pub occurrences: usize,
}

/// What an interpreter makes of the lines it is fed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A line worth showing as-is.
    Display(String),
    /// A tool error worth showing.
    Error(String),
    /// Completion estimate, `0..=100`.
    Progress(u8),
    CredentialFound(Credential),
    /// The directory scan needs a restart with an exclusion filter.
    NoiseTooBroad(Noise),
    /// The fuzzing run settled on a baseline and filtered it out.
    DirtyBaseline(Baseline),
    /// A non-baseline virtual host; `name` is the fully qualified host.
    SubdomainFound { name: String, ip: IpAddr },
    /// Account names extracted by identity enumeration.
    UsersFound(Vec<String>),
    /// Stop running further stages of this scan.
    Halt(String),
    /// Accumulated result text of the whole scan.
    ScanComplete(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(String),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    Started {
        protocol: Protocol,
        target: Target,
        command: String,
    },
    Signal {
        protocol: Protocol,
        signal: Signal,
    },
    Finished {
        protocol: Protocol,
        target: Target,
        outcome: Outcome,
    },
}

impl ScanEvent {
    pub fn protocol(&self) -> Protocol {
        match self {
            ScanEvent::Started { protocol, .. }
            | ScanEvent::Signal { protocol, .. }
            | ScanEvent::Finished { protocol, .. } => *protocol,
        }
    }
}
