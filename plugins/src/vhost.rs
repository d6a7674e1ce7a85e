use std::path::PathBuf;

use huntr_common::config::Config;
use huntr_common::error::ScanError;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::wfuzz::VhostInterpreter;

use crate::{ScanPlugin, wordlist};

/// Virtual host fuzzing. Needs a root domain to build `Host:` headers from.
pub struct VhostPlugin {
    wfuzz: String,
    wordlist: PathBuf,
    threads: u16,
}

impl VhostPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            wfuzz: cfg.tools.wfuzz.clone(),
            wordlist: cfg.wordlists.vhosts.clone(),
            threads: cfg.tools.wfuzz_threads,
        }
    }
}

impl ScanPlugin for VhostPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::VhostFuzz
    }

    fn validate(&self, target: &Target) -> Result<(), ScanError> {
        if target.ip().is_unspecified() {
            return Err(ScanError::invalid_target(
                target.ip().to_string(),
                "unspecified address",
            ));
        }
        if target.domain().is_none() {
            return Err(ScanError::invalid_target(
                target.to_string(),
                "virtual host fuzzing needs a domain",
            ));
        }
        Ok(())
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        let domain = target.domain().unwrap_or_default();
        vec![
            Invocation::new(&self.wfuzz)
                .arg("-w")
                .arg(self.wordlist.to_string_lossy())
                .arg("-H")
                .arg(format!("Host: FUZZ.{domain}"))
                .args(["-t".to_string(), self.threads.to_string()])
                .arg(format!("http://{}", target.ip())),
        ]
    }

    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter> {
        Box::new(VhostInterpreter::new(
            target.domain().unwrap_or_default(),
            target.ip(),
            wordlist::entry_count(&self.wordlist),
        ))
    }
}
