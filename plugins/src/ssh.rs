use std::path::PathBuf;

use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::credentials::{CredentialFormat, CredentialInterpreter};

use crate::ScanPlugin;

pub struct SshPlugin {
    hydra: String,
    users: PathBuf,
    passwords: PathBuf,
    tasks: u16,
}

impl SshPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            hydra: cfg.tools.hydra.clone(),
            users: cfg.users_file.clone(),
            passwords: cfg.passwords_file.clone(),
            tasks: cfg.tools.hydra_tasks,
        }
    }
}

impl ScanPlugin for SshPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::Ssh
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        vec![
            Invocation::new(&self.hydra)
                .arg("-L")
                .arg(self.users.to_string_lossy())
                .arg("-P")
                .arg(self.passwords.to_string_lossy())
                .arg(target.ip().to_string())
                .arg("ssh")
                .args(["-t".to_string(), self.tasks.to_string()]),
        ]
    }

    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter> {
        Box::new(CredentialInterpreter::new(
            Protocol::Ssh,
            CredentialFormat::Hydra,
            target.ip(),
        ))
    }
}
