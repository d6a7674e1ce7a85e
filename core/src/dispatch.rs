use std::collections::BTreeSet;

use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use tracing::debug;

/// Scanners that follow up on an open port.
pub fn protocols_for(port: u16) -> &'static [Protocol] {
    match port {
        21 => &[Protocol::Ftp],
        22 => &[Protocol::Ssh],
        80 => &[Protocol::DirBust, Protocol::VhostFuzz],
        88 => &[Protocol::Kerberos],
        389 | 3268 => &[Protocol::Ldap],
        5985 => &[Protocol::Winrm],
        _ => &[],
    }
}

/// Turns open ports into scan requests. Lives for one session so the
/// directory service, reachable on two ports, is only scanned once.
#[derive(Debug, Default)]
pub struct PortDispatcher {
    directory_service_triggered: bool,
}

impl PortDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&mut self, ports: &BTreeSet<u16>, target: &Target) -> Vec<(Protocol, Target)> {
        let mut planned: Vec<(Protocol, Target)> = Vec::new();

        for &port in ports {
            for &protocol in protocols_for(port) {
                if planned.iter().any(|(p, _)| *p == protocol) {
                    continue;
                }
                if protocol == Protocol::Ldap {
                    if self.directory_service_triggered {
                        continue;
                    }
                    self.directory_service_triggered = true;
                }
                if protocol == Protocol::VhostFuzz && target.domain().is_none() {
                    debug!(port, "no domain known, skipping virtual host fuzzing");
                    continue;
                }
                planned.push((protocol, target.clone()));
            }
        }
        planned
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> Target {
        Target::with_domain("10.10.11.5".parse().unwrap(), "board.htb").unwrap()
    }

    fn protocols(plan: &[(Protocol, Target)]) -> Vec<Protocol> {
        plan.iter().map(|(p, _)| *p).collect()
    }

    #[test]
    fn http_and_ssh_trigger_each_scan_once() {
        let mut dispatcher = PortDispatcher::new();
        let plan = dispatcher.plan(&BTreeSet::from([22, 80]), &named());
        assert_eq!(
            protocols(&plan),
            vec![Protocol::Ssh, Protocol::DirBust, Protocol::VhostFuzz]
        );
    }

    #[test]
    fn directory_service_ports_coalesce() {
        let mut dispatcher = PortDispatcher::new();
        let plan = dispatcher.plan(&BTreeSet::from([389, 3268]), &named());
        assert_eq!(protocols(&plan), vec![Protocol::Ldap]);

        let again = dispatcher.plan(&BTreeSet::from([3268]), &named());
        assert!(again.is_empty());
    }

    #[test]
    fn unmapped_ports_are_ignored() {
        let mut dispatcher = PortDispatcher::new();
        assert!(dispatcher.plan(&BTreeSet::from([443, 8080]), &named()).is_empty());
    }

    #[test]
    fn fuzzing_needs_a_domain() {
        let mut dispatcher = PortDispatcher::new();
        let bare = Target::new("10.10.11.5".parse().unwrap());
        let plan = dispatcher.plan(&BTreeSet::from([80, 88, 5985]), &bare);
        assert_eq!(
            protocols(&plan),
            vec![Protocol::DirBust, Protocol::Kerberos, Protocol::Winrm]
        );
    }
}
