use std::net::IpAddr;

use async_trait::async_trait;

use crate::events::ScanEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddHostDecision {
    Add,
    Skip,
}

/// The presentation layer as seen from the orchestrator.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Renders one scanner event.
    fn event(&self, event: &ScanEvent);

    /// A status message from the orchestrator itself.
    fn notice(&self, message: &str);

    fn discovery_started(&self, target: &str);

    fn discovery_finished(&self, output: &str);

    /// Asks whether `ip name` should be persisted to the hosts store.
    async fn confirm_host_entry(&self, ip: IpAddr, name: &str) -> AddHostDecision;
}
