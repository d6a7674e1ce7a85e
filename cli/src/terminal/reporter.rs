use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use colored::*;
use huntr_common::config::Config;
use huntr_common::events::{Outcome, ScanEvent, Signal};
use huntr_common::protocol::Protocol;
use huntr_common::reporter::{AddHostDecision, Reporter};
use huntr_common::{error, info, success, warn};
use indicatif::ProgressBar;
use tracing::debug;

use crate::terminal::{colors, print, prompt, spinner};

fn title(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Ftp => "FTP brute force",
        Protocol::Ssh => "SSH brute force",
        Protocol::DirBust => "Directory scan",
        Protocol::VhostFuzz => "Virtual host fuzzing",
        Protocol::Kerberos => "RID enumeration",
        Protocol::Ldap => "LDAP enumeration",
        Protocol::Winrm => "WinRM brute force",
    }
}

/// Scanners whose raw output is already streamed line by line; their
/// accumulated result is not printed a second time.
fn streams_raw(protocol: Protocol) -> bool {
    matches!(protocol, Protocol::Ldap | Protocol::Kerberos)
}

pub struct TerminalReporter {
    quiet: u8,
    disable_input: bool,
    hosts_file: PathBuf,
    bars: Mutex<HashMap<Protocol, ProgressBar>>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new(cfg: &Config) -> Self {
        Self {
            quiet: cfg.quiet,
            disable_input: cfg.disable_input,
            hosts_file: cfg.hosts_file.clone(),
            bars: Mutex::new(HashMap::new()),
            spinner: Mutex::new(None),
        }
    }

    fn progress(&self, protocol: Protocol, percent: u8) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        let bar = bars
            .entry(protocol)
            .or_insert_with(|| spinner::scan_bar(protocol.name()));
        bar.set_position(u64::from(percent));
    }

    fn clear_bar(&self, protocol: Protocol) {
        if let Some(bar) = self.bars.lock().ok().and_then(|mut b| b.remove(&protocol)) {
            bar.finish_and_clear();
            spinner::multi().remove(&bar);
        }
    }

    fn signal(&self, protocol: Protocol, signal: &Signal) {
        match signal {
            Signal::Display(line) => {
                if self.quiet == 0 {
                    print::tool_line(protocol, line);
                }
            }
            Signal::Error(line) => error!("[{}] {}", protocol, line),
            Signal::Progress(percent) => self.progress(protocol, *percent),
            Signal::CredentialFound(cred) => success!(
                "Valid {} credentials: {}",
                cred.service,
                format!("{}:{}", cred.username, cred.password).color(colors::CREDENTIAL)
            ),
            Signal::DirtyBaseline(baseline) => info!(
                "Filtered baseline response: status {} with {} words ({} hits)",
                baseline.status_code, baseline.words, baseline.occurrences
            ),
            Signal::SubdomainFound { name, ip } => success!(
                "Virtual host found: {} ({})",
                name.color(colors::HOSTNAME),
                ip
            ),
            Signal::UsersFound(users) => success!("Found {} usernames", users.len()),
            Signal::ScanComplete(lines) => {
                if self.quiet == 0 && !streams_raw(protocol) {
                    for line in lines {
                        print::print(line);
                    }
                }
            }
            Signal::NoiseTooBroad(_) | Signal::Halt(_) => debug!(%protocol, ?signal, "control signal"),
        }
    }
}

#[async_trait]
impl Reporter for TerminalReporter {
    fn event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Started {
                protocol,
                target,
                command,
            } => {
                self.clear_bar(*protocol);
                print::header(&format!("{} on {}", title(*protocol), target), self.quiet);
                info!("Running: {}", command.bright_black());
            }
            ScanEvent::Signal { protocol, signal } => self.signal(*protocol, signal),
            ScanEvent::Finished {
                protocol,
                target,
                outcome,
            } => {
                self.clear_bar(*protocol);
                match outcome {
                    Outcome::Completed => success!("{} on {} finished", title(*protocol), target),
                    Outcome::Failed(reason) => {
                        error!("{} on {} failed: {}", title(*protocol), target, reason)
                    }
                    Outcome::Cancelled => warn!("{} on {} cancelled", title(*protocol), target),
                }
            }
        }
    }

    fn notice(&self, message: &str) {
        info!("{message}");
    }

    fn discovery_started(&self, target: &str) {
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner::discovery_spinner(target));
        }
    }

    fn discovery_finished(&self, output: &str) {
        if let Some(pb) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            pb.finish_and_clear();
            spinner::multi().remove(&pb);
        }
        if self.quiet > 0 {
            return;
        }
        print::header("discovery report", self.quiet);
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            print::print(&format!("{}", line.color(colors::TOOL_OUTPUT)));
        }
    }

    async fn confirm_host_entry(&self, ip: IpAddr, name: &str) -> AddHostDecision {
        if self.disable_input || !console::user_attended() {
            info!("Skipping hosts entry {ip} {name} (input disabled)");
            return AddHostDecision::Skip;
        }

        let question = format!("Add {} {} to {}?", ip, name, self.hosts_file.display());
        let multi = spinner::multi().clone();
        let answer = tokio::task::spawn_blocking(move || {
            multi.suspend(|| prompt::confirm(&question))
        })
        .await;

        match answer {
            Ok(Ok(true)) => AddHostDecision::Add,
            Ok(Ok(false)) => AddHostDecision::Skip,
            Ok(Err(e)) => {
                warn!("Could not read an answer: {e}");
                AddHostDecision::Skip
            }
            Err(e) => {
                warn!("Prompt task failed: {e}");
                AddHostDecision::Skip
            }
        }
    }
}
