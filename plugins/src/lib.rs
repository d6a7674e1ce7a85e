//! # Scan Plugins
//!
//! One plugin per [`Protocol`]. A plugin knows how to turn a [`Target`] into
//! the external commands to run and which interpreter reads their output.
//! Plugins hold no runtime state; the scanner task in `huntr-core` owns
//! process lifecycles and cancellation.
//!
//! **Architectural Note:**
//! The core never matches on protocols to build commands. It asks
//! [`for_protocol`] for the plugin and drives it through [`ScanPlugin`], so
//! adding a protocol means adding a module here and a variant in
//! `huntr-common`.

use std::sync::Arc;

use huntr_common::config::Config;
use huntr_common::error::ScanError;
use huntr_common::events::Noise;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;

pub mod discovery;
pub mod wordlist;

mod dirbust;
mod ftp;
mod kerberos;
mod ldap;
mod ssh;
mod vhost;
mod winrm;

pub use dirbust::DirBustPlugin;
pub use ftp::FtpPlugin;
pub use kerberos::KerberosPlugin;
pub use ldap::LdapPlugin;
pub use ssh::SshPlugin;
pub use vhost::VhostPlugin;
pub use winrm::WinrmPlugin;

pub trait ScanPlugin: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Refuses targets the scan cannot run against. Nothing is launched for
    /// a rejected target.
    fn validate(&self, target: &Target) -> Result<(), ScanError> {
        if target.ip().is_unspecified() {
            return Err(ScanError::invalid_target(
                target.ip().to_string(),
                "unspecified address",
            ));
        }
        Ok(())
    }

    /// Commands to run, in order. Each one is a stage.
    fn invocations(&self, target: &Target) -> Vec<Invocation>;

    /// A fresh interpreter for one run.
    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter>;

    /// Extra arguments that suppress `noise` on a restart. Protocols that
    /// never report noise keep the default.
    fn exclusion_args(&self, _noise: &Noise) -> Option<Vec<String>> {
        None
    }
}

/// Builds the plugin for `protocol` from the session configuration.
pub fn for_protocol(protocol: Protocol, cfg: &Config) -> Arc<dyn ScanPlugin> {
    match protocol {
        Protocol::Ftp => Arc::new(FtpPlugin::new(cfg)),
        Protocol::Ssh => Arc::new(SshPlugin::new(cfg)),
        Protocol::DirBust => Arc::new(DirBustPlugin::new(cfg)),
        Protocol::VhostFuzz => Arc::new(VhostPlugin::new(cfg)),
        Protocol::Kerberos => Arc::new(KerberosPlugin::new(cfg)),
        Protocol::Ldap => Arc::new(LdapPlugin::new(cfg)),
        Protocol::Winrm => Arc::new(WinrmPlugin::new(cfg)),
    }
}
