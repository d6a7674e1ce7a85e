use std::path::PathBuf;

use thiserror::Error;

/// Failures that stay local to one scanner or one store write.
///
/// None of these are fatal to a session: the orchestrator reports them and
/// keeps sibling scans and the discovery loop running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The external binary is missing or not executable.
    #[error("failed to launch {program}: {reason}")]
    LaunchFailure { program: String, reason: String },

    /// Empty or malformed address handed to a scanner; refused before launch.
    #[error("invalid target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    /// The hosts store could not be written, even through the privileged path.
    #[error("could not write hosts entry to {}: {reason}", path.display())]
    ResolverWrite { path: PathBuf, reason: String },

    /// The credential scratch files could not be appended to.
    #[error("could not append to {}: {reason}", path.display())]
    CredentialWrite { path: PathBuf, reason: String },

    #[error("unknown protocol '{0}'")]
    UnknownProtocol(String),
}

impl ScanError {
    pub fn invalid_target(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
