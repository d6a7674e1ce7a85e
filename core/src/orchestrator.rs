//! # Scan Orchestrator
//!
//! Top-level controller of a session:
//!
//! 1. runs the service discovery scan and reads its report,
//! 2. settles on domain or IP targeting,
//! 3. dispatches open ports to scanners,
//! 4. consumes the shared event channel, persisting credentials and names
//!    and feeding the subdomain discovery loop, until the session settles or
//!    is interrupted.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use huntr_common::config::Config;
use huntr_common::credentials::CredentialStore;
use huntr_common::error::ScanError;
use huntr_common::events::{Credential, ScanEvent, Signal};
use huntr_common::hosts::HostResolver;
use huntr_common::protocol::Protocol;
use huntr_common::reporter::{AddHostDecision, Reporter};
use huntr_common::target::{ScanInput, Target};
use huntr_plugins::discovery::discovery_invocation;
use huntr_protocols::nmap::{DiscoveryReport, parse_discovery};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::discovery::SubdomainDiscovery;
use crate::dispatch::PortDispatcher;
use crate::registry::ScanRegistry;
use crate::runner::ProcessRunner;

pub struct ScanOrchestrator {
    cfg: Arc<Config>,
    runner: Arc<dyn ProcessRunner>,
    resolver: Arc<dyn HostResolver>,
    credentials: Arc<dyn CredentialStore>,
    reporter: Arc<dyn Reporter>,
    registry: ScanRegistry,
    dispatcher: PortDispatcher,
    events: mpsc::UnboundedReceiver<ScanEvent>,
    discovery: Option<SubdomainDiscovery>,
    /// Started runs whose final event has not been consumed yet.
    in_flight: usize,
}

impl ScanOrchestrator {
    pub fn new(
        cfg: Arc<Config>,
        runner: Arc<dyn ProcessRunner>,
        resolver: Arc<dyn HostResolver>,
        credentials: Arc<dyn CredentialStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            registry: ScanRegistry::new(Arc::clone(&cfg), Arc::clone(&runner), tx),
            cfg,
            runner,
            resolver,
            credentials,
            reporter,
            dispatcher: PortDispatcher::new(),
            events: rx,
            discovery: None,
            in_flight: 0,
        }
    }

    pub fn registry(&self) -> &ScanRegistry {
        &self.registry
    }

    pub fn discovery(&self) -> Option<&SubdomainDiscovery> {
        self.discovery.as_ref()
    }

    /// Runs the service discovery scan against `input` and parses the report.
    pub async fn discover(&self, input: &ScanInput) -> anyhow::Result<DiscoveryReport> {
        let invocation = discovery_invocation(input, &self.cfg);
        debug!("discovery: `{invocation}`");
        self.reporter.discovery_started(&input.as_arg());

        let mut handle = self.runner.start(&invocation);
        if let Some(reason) = handle.launch_error() {
            self.reporter.discovery_finished("");
            return Err(ScanError::LaunchFailure {
                program: invocation.program.clone(),
                reason: reason.to_string(),
            }
            .into());
        }

        let mut output = String::new();
        while let Some(line) = handle.next_line().await {
            if line.is_stderr() {
                debug!("nmap: {}", line.text);
                continue;
            }
            output.push_str(&line.text);
            output.push('\n');
        }
        handle.wait().await;

        self.reporter.discovery_finished(&output);
        Ok(parse_discovery(&output))
    }

    /// Decides how the session addresses the host. Fixed for the rest of the
    /// session.
    pub async fn resolve_target(
        &self,
        input: &ScanInput,
        report: &DiscoveryReport,
    ) -> anyhow::Result<Target> {
        let ip = report.ip.or(input.address()).ok_or_else(|| {
            ScanError::invalid_target(input.as_arg(), "discovery reported no address")
        })?;

        if let ScanInput::Hostname(name) = input {
            return Ok(Target::with_domain(ip, name)?);
        }

        if let Some(domain) = self.resolver.lookup(ip)? {
            debug!(%ip, %domain, "domain known to the hosts store");
            return Ok(Target::with_domain(ip, &domain)?);
        }

        let Some(domain) = report.domain.as_deref() else {
            return Ok(Target::new(ip));
        };

        if self.resolver.contains(domain)? {
            return Ok(Target::with_domain(ip, domain)?);
        }

        match self.reporter.confirm_host_entry(ip, domain).await {
            AddHostDecision::Add => match self.add_host(ip, domain).await {
                Ok(_) => {
                    self.reporter.notice(&format!("Added {ip} {domain} to the hosts file"));
                    Ok(Target::with_domain(ip, domain)?)
                }
                Err(e) => {
                    error!("{e:#}");
                    Ok(Target::new(ip))
                }
            },
            AddHostDecision::Skip => Ok(Target::new(ip)),
        }
    }

    /// Discovery, targeting and dispatch. Returns the settled target; call
    /// [`drive`](Self::drive) afterwards to process results.
    pub async fn scan(&mut self, input: &ScanInput) -> anyhow::Result<Target> {
        let report = self.discover(input).await?;
        let target = self.resolve_target(input, &report).await?;
        self.discovery = Some(SubdomainDiscovery::new(
            target.ip(),
            target.domain().map(str::to_string),
        ));

        if report.open_ports.is_empty() {
            self.reporter.notice("No open ports with a matching scanner.");
        }

        let plan = self.dispatcher.plan(&report.open_ports, &target);
        for (protocol, target) in plan {
            let _ = self.start(protocol, target).await;
        }
        Ok(target)
    }

    /// Runs one scanner on demand, outside of port dispatch.
    pub async fn run_manual(&mut self, protocol: Protocol, target: Target) -> Result<(), ScanError> {
        if self.discovery.is_none() {
            self.discovery = Some(SubdomainDiscovery::new(
                target.ip(),
                target.domain().map(str::to_string),
            ));
        }
        self.start(protocol, target).await
    }

    /// Processes scanner events until the session settles, or until
    /// `shutdown` resolves. Every live scan is cancelled and joined before
    /// returning.
    pub async fn drive<F>(&mut self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let period = self.cfg.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.is_settled() {
            let armed = self.discovery.as_ref().is_some_and(SubdomainDiscovery::is_armed);

            tokio::select! {
                _ = &mut shutdown => {
                    self.reporter.notice("Interrupted, stopping scans...");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = ticker.tick(), if armed => self.poll_subdomains(false).await,
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Cancels all live scans and flushes their final events.
    pub async fn shutdown(&mut self) {
        self.registry.shutdown().await;
        while let Ok(event) = self.events.try_recv() {
            self.reporter.event(&event);
            if matches!(event, ScanEvent::Finished { .. }) {
                self.in_flight = self.in_flight.saturating_sub(1);
            }
        }
    }

    fn is_settled(&self) -> bool {
        !self.cfg.follow
            && self.in_flight == 0
            && self.discovery.as_ref().is_none_or(|d| d.pending() == 0)
    }

    async fn start(&mut self, protocol: Protocol, target: Target) -> Result<(), ScanError> {
        match self.registry.run(protocol, target).await {
            Ok(()) => {
                self.in_flight += 1;
                Ok(())
            }
            Err(e) => {
                warn!(%protocol, "{e}");
                Err(e)
            }
        }
    }

    async fn handle(&mut self, event: ScanEvent) {
        self.reporter.event(&event);

        match event {
            ScanEvent::Signal { signal, .. } => match signal {
                Signal::CredentialFound(cred) => self.store_credential(&cred),
                Signal::UsersFound(users) => self.store_usernames(&users),
                Signal::SubdomainFound { name, ip } => self.offer_host(ip, &name).await,
                _ => {}
            },
            ScanEvent::Finished { protocol, .. } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if protocol.is_directory_scan() {
                    if let Some(discovery) = self.discovery.as_mut() {
                        discovery.arm();
                    }
                    self.poll_subdomains(true).await;
                }
            }
            ScanEvent::Started { .. } => {}
        }
    }

    fn store_usernames(&self, users: &[String]) {
        let mut saved = 0;
        for user in users {
            match self.credentials.append_username(user) {
                Ok(()) => saved += 1,
                Err(e) => error!("{e:#}"),
            }
        }
        if saved > 0 {
            self.reporter
                .notice(&format!("Saved {saved} usernames to the username list"));
        }
    }

    fn store_credential(&self, cred: &Credential) {
        let stored = self
            .credentials
            .append_username(&cred.username)
            .and_then(|_| self.credentials.append_password(&cred.password));
        if let Err(e) = stored {
            error!("{e:#}");
        }
    }

    /// Offers to persist a virtual host found by fuzzing. An accepted entry
    /// is picked up by an immediate re-poll.
    async fn offer_host(&mut self, ip: IpAddr, name: &str) {
        match self.resolver.contains(name) {
            Ok(true) => {
                debug!(name, "already in the hosts store");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                error!("{e:#}");
                return;
            }
        }

        if self.reporter.confirm_host_entry(ip, name).await == AddHostDecision::Skip {
            return;
        }
        match self.add_host(ip, name).await {
            Ok(_) => {
                self.reporter.notice(&format!("Added {ip} {name} to the hosts file"));
                if let Some(discovery) = self.discovery.as_mut() {
                    discovery.arm();
                }
                self.poll_subdomains(true).await;
            }
            Err(e) => error!("{e:#}"),
        }
    }

    /// Hosts writes may fall back to an interactive helper, so they run off
    /// the control task.
    async fn add_host(&self, ip: IpAddr, name: &str) -> anyhow::Result<bool> {
        let resolver = Arc::clone(&self.resolver);
        let name = name.to_string();
        tokio::task::spawn_blocking(move || resolver.add_entry(ip, &name)).await?
    }

    async fn poll_subdomains(&mut self, announce: bool) {
        let Some(discovery) = self.discovery.as_mut() else {
            return;
        };

        match discovery.poll(self.resolver.as_ref()) {
            Ok(queued) if queued.is_empty() => {
                if announce && discovery.pending() == 0 {
                    self.reporter.notice("No additional subdomains found.");
                }
            }
            Ok(queued) => {
                for name in queued {
                    self.reporter.notice(&format!("Queued subdomain {name}"));
                }
            }
            Err(e) => error!("{e:#}"),
        }

        self.start_next_subdomain().await;
    }

    async fn start_next_subdomain(&mut self) {
        let busy = self.registry.is_running(Protocol::DirBust);
        let Some(discovery) = self.discovery.as_mut() else {
            return;
        };
        let Some(name) = discovery.pop_next(busy) else {
            return;
        };
        let ip = discovery.base_ip();

        match Target::with_domain(ip, &name) {
            Ok(target) => {
                self.reporter.notice(&format!("Starting directory scan on {name}"));
                let _ = self.start(Protocol::DirBust, target).await;
            }
            Err(e) => warn!("{e}"),
        }
    }
}
