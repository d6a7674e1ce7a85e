//! # Subdomain Discovery Loop
//!
//! Watches the hosts store for new names mapped to the session's address and
//! feeds them, one at a time, to the directory scanner.
//!
//! The loop state is owned by the orchestrator and only mutated from its
//! control task. Scanners never touch it; they report names through events.

use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;

use huntr_common::hosts::{HostResolver, dot_count};
use tracing::debug;

#[derive(Debug)]
pub struct SubdomainDiscovery {
    base_ip: IpAddr,
    base_domain: Option<String>,
    /// Every name ever queued. Never shrinks.
    found: HashSet<String>,
    queue: VecDeque<String>,
    armed: bool,
}

impl SubdomainDiscovery {
    pub fn new(base_ip: IpAddr, base_domain: Option<String>) -> Self {
        Self {
            base_ip,
            base_domain,
            found: HashSet::new(),
            queue: VecDeque::new(),
            armed: false,
        }
    }

    pub fn base_ip(&self) -> IpAddr {
        self.base_ip
    }

    pub fn base_domain(&self) -> Option<&str> {
        self.base_domain.as_deref()
    }

    /// Starts periodic polling. Happens after the first directory scan.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Classifies `names` (all mapped to the base address, in store order)
    /// and queues the unseen subdomains. Returns the newly queued names.
    pub fn observe<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queued = Vec::new();
        for name in names {
            let name = name.as_ref().to_ascii_lowercase();

            let Some(base) = self.base_domain.as_deref() else {
                debug!(%name, "base domain settled");
                self.base_domain = Some(name);
                continue;
            };
            if name == base || dot_count(&name) <= 1 {
                continue;
            }
            if self.found.insert(name.clone()) {
                self.queue.push_back(name.clone());
                queued.push(name);
            }
        }
        queued
    }

    /// Reads the current names for the base address and queues new ones.
    pub fn poll(&mut self, resolver: &dyn HostResolver) -> anyhow::Result<Vec<String>> {
        let names = resolver.names_for(self.base_ip)?;
        Ok(self.observe(names))
    }

    /// Next subdomain to scan, unless a directory scan is already running.
    pub fn pop_next(&mut self, directory_scan_running: bool) -> Option<String> {
        if directory_scan_running {
            return None;
        }
        self.queue.pop_front()
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
