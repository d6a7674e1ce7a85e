use std::path::PathBuf;

use huntr_common::config::Config;
use huntr_common::events::Noise;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::gobuster::DirectoryInterpreter;

use crate::{ScanPlugin, wordlist};

/// Directory brute force over plain HTTP. Addresses the target by name when
/// one is known so virtual hosts are reached.
pub struct DirBustPlugin {
    gobuster: String,
    wordlist: PathBuf,
    threads: u16,
}

impl DirBustPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            gobuster: cfg.tools.gobuster.clone(),
            wordlist: cfg.wordlists.directories.clone(),
            threads: cfg.tools.gobuster_threads,
        }
    }
}

impl ScanPlugin for DirBustPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::DirBust
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        vec![
            Invocation::new(&self.gobuster)
                .arg("dir")
                .arg("-u")
                .arg(format!("http://{}", target.host()))
                .arg("-w")
                .arg(self.wordlist.to_string_lossy())
                .args(["--no-error", "--no-progress", "--retry"])
                .args(["--retry-attempts", "3", "--timeout", "30s"])
                .args(["-t".to_string(), self.threads.to_string()]),
        ]
    }

    fn interpreter(&self, _target: &Target) -> Box<dyn Interpreter> {
        Box::new(DirectoryInterpreter::new(wordlist::entry_count(
            &self.wordlist,
        )))
    }

    fn exclusion_args(&self, noise: &Noise) -> Option<Vec<String>> {
        Some(vec![format!("--exclude-length={}", noise.length)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_domain_when_known() {
        let plugin = DirBustPlugin::new(&Config::default());
        let target = Target::with_domain("10.10.11.5".parse().unwrap(), "board.htb").unwrap();
        let inv = &plugin.invocations(&target)[0];
        assert!(inv.has_arg("http://board.htb"));
        assert!(inv.has_arg("--no-progress"));
    }

    #[test]
    fn exclusion_uses_noise_length() {
        let plugin = DirBustPlugin::new(&Config::default());
        let noise = Noise {
            status_code: Some(200),
            length: 1337,
        };
        assert_eq!(
            plugin.exclusion_args(&noise),
            Some(vec!["--exclude-length=1337".to_string()])
        );
    }
}
