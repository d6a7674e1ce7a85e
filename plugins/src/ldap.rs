use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::ldap::DirectoryServiceInterpreter;

use crate::ScanPlugin;

pub struct LdapPlugin {
    nmap: String,
    ldapsearch: String,
}

impl LdapPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            nmap: cfg.tools.nmap.clone(),
            ldapsearch: cfg.tools.ldapsearch.clone(),
        }
    }
}

impl ScanPlugin for LdapPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::Ldap
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        let ip = target.ip().to_string();
        vec![
            Invocation::new(&self.nmap)
                .args(["-sV", "--script", "ldap* and not brute"])
                .arg(&ip),
            Invocation::new(&self.ldapsearch)
                .args(["-x", "-h"])
                .arg(&ip)
                .args(["-s", "base"]),
        ]
    }

    fn interpreter(&self, _target: &Target) -> Box<dyn Interpreter> {
        Box::new(DirectoryServiceInterpreter::new())
    }
}
