use std::path::PathBuf;

use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::credentials::{CredentialFormat, CredentialInterpreter};

use crate::ScanPlugin;

pub struct WinrmPlugin {
    netexec: String,
    users: PathBuf,
    passwords: PathBuf,
}

impl WinrmPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            netexec: cfg.tools.netexec.clone(),
            users: cfg.users_file.clone(),
            passwords: cfg.passwords_file.clone(),
        }
    }
}

impl ScanPlugin for WinrmPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::Winrm
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        vec![
            Invocation::new(&self.netexec)
                .arg("winrm")
                .arg(target.ip().to_string())
                .arg("-u")
                .arg(self.users.to_string_lossy())
                .arg("-p")
                .arg(self.passwords.to_string_lossy()),
        ]
    }

    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter> {
        Box::new(CredentialInterpreter::new(
            Protocol::Winrm,
            CredentialFormat::Netexec,
            target.ip(),
        ))
    }
}
