use std::path::PathBuf;

use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::credentials::{CredentialFormat, CredentialInterpreter};

use crate::ScanPlugin;

/// Default-credential brute force against FTP using a combined
/// `user:pass` list.
pub struct FtpPlugin {
    hydra: String,
    combos: PathBuf,
}

impl FtpPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            hydra: cfg.tools.hydra.clone(),
            combos: cfg.wordlists.ftp_defaults.clone(),
        }
    }
}

impl ScanPlugin for FtpPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::Ftp
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        vec![
            Invocation::new(&self.hydra)
                .arg("-C")
                .arg(self.combos.to_string_lossy())
                .arg(format!("ftp://{}", target.ip())),
        ]
    }

    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter> {
        Box::new(CredentialInterpreter::new(
            Protocol::Ftp,
            CredentialFormat::Hydra,
            target.ip(),
        ))
    }
}
