use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_protocols::Interpreter;
use huntr_protocols::rid::IdentityInterpreter;

use crate::ScanPlugin;

/// RID brute force with a low-privilege account, then a share crawl that
/// downloads whatever it can reach.
pub struct KerberosPlugin {
    netexec: String,
    smbscan: String,
    rid_user: String,
}

impl KerberosPlugin {
    pub fn new(cfg: &Config) -> Self {
        Self {
            netexec: cfg.tools.netexec.clone(),
            smbscan: cfg.tools.smbscan.clone(),
            rid_user: cfg.rid_user.clone(),
        }
    }
}

impl ScanPlugin for KerberosPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::Kerberos
    }

    fn invocations(&self, target: &Target) -> Vec<Invocation> {
        let ip = target.ip().to_string();
        vec![
            Invocation::new(&self.netexec)
                .arg("smb")
                .arg(&ip)
                .arg("-u")
                .arg(&self.rid_user)
                .args(["-p", "", "--rid-brute"]),
            Invocation::new(&self.smbscan)
                .arg(&ip)
                .args(["--download-files", "--max-depth", "3"]),
        ]
    }

    fn interpreter(&self, target: &Target) -> Box<dyn Interpreter> {
        Box::new(IdentityInterpreter::new(target.ip()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_enumeration_before_share_crawl() {
        let plugin = KerberosPlugin::new(&Config::default());
        let target = Target::new("10.10.11.5".parse().unwrap());
        let invs = plugin.invocations(&target);
        assert_eq!(invs.len(), 2);
        assert!(invs[0].has_arg("--rid-brute"));
        assert!(invs[0].has_arg("guest"));
        assert_eq!(invs[1].program, "smbscan");
    }
}
