use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use huntr_common::events::{Outcome, ScanEvent, Signal};
use huntr_common::process::Invocation;
use huntr_common::protocol::Protocol;
use huntr_common::reporter::{AddHostDecision, Reporter};
use huntr_core::runner::{ProcessHandle, ProcessRunner};
use tokio::sync::{mpsc, oneshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Start(Invocation),
    Cancel(String),
}

/// What one fake process prints.
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Keep running until cancelled.
    pub hold: bool,
    /// Fail to launch.
    pub missing: bool,
}

impl Script {
    pub fn stdout(lines: &[&str]) -> Self {
        Self {
            stdout: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn stderr(lines: &[&str]) -> Self {
        Self {
            stderr: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn held() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }
}

/// Records every start and cancel, and replays scripted output per program.
/// Programs without a queued script print nothing and exit.
#[derive(Default)]
pub struct FakeRunner {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, program: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn starts(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Start(inv) if inv.program == program => Some(inv),
                _ => None,
            })
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn start(&self, invocation: &Invocation) -> ProcessHandle {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Start(invocation.clone()));

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&invocation.program)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();

        if script.missing {
            return ProcessHandle::launch_failure("No such file or directory (os error 2)");
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (err_tx, err_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit_rx) = oneshot::channel();

        for line in script.stdout {
            out_tx.send(line).unwrap();
        }
        for line in script.stderr {
            err_tx.send(line).unwrap();
        }

        if script.hold {
            let calls = Arc::clone(&self.calls);
            let program = invocation.program.clone();
            tokio::spawn(async move {
                let _ = kill_rx.await;
                calls.lock().unwrap().push(Call::Cancel(program));
                drop(out_tx);
                drop(err_tx);
                let _ = exit_tx.send(None);
            });
        } else {
            drop(out_tx);
            drop(err_tx);
            let _ = exit_tx.send(Some(0));
        }

        ProcessHandle::new(out_rx, err_rx, kill_tx, exit_rx)
    }
}

/// Collects everything the orchestrator reports and answers host prompts
/// with a fixed decision.
pub struct RecordingReporter {
    decision: AddHostDecision,
    events: Mutex<Vec<ScanEvent>>,
    notices: Mutex<Vec<String>>,
    asked: Mutex<Vec<(IpAddr, String)>>,
}

impl RecordingReporter {
    pub fn new(decision: AddHostDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            events: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn asked(&self) -> Vec<(IpAddr, String)> {
        self.asked.lock().unwrap().clone()
    }

    pub fn signals(&self, protocol: Protocol) -> Vec<Signal> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Signal { protocol: p, signal } if p == protocol => Some(signal),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self, protocol: Protocol) -> Vec<Outcome> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Finished {
                    protocol: p,
                    outcome,
                    ..
                } if p == protocol => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    fn event(&self, event: &ScanEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn discovery_started(&self, _target: &str) {}

    fn discovery_finished(&self, _output: &str) {}

    async fn confirm_host_entry(&self, ip: IpAddr, name: &str) -> AddHostDecision {
        self.asked.lock().unwrap().push((ip, name.to_string()));
        self.decision
    }
}

/// Waits for the next `Finished` event on `rx`, passing over everything else.
pub async fn next_finished(rx: &mut mpsc::UnboundedReceiver<ScanEvent>) -> ScanEvent {
    loop {
        let event = rx.recv().await.expect("event channel closed");
        if matches!(event, ScanEvent::Finished { .. }) {
            return event;
        }
    }
}
