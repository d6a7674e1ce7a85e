//! # Scanner Task
//!
//! One long-lived task per protocol. A task owns at most one running job at
//! a time; starting a new run cancels and joins the previous job first, so
//! two processes for the same protocol are never alive together.
//!
//! A job walks the plugin's invocations in order, feeding every line through
//! the interpreter and forwarding the resulting signals, tagged with the
//! protocol, down the shared event channel.

use std::sync::Arc;

use huntr_common::error::ScanError;
use huntr_common::events::{Noise, Outcome, ScanEvent, Signal};
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_plugins::ScanPlugin;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::runner::ProcessRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Cancelling,
    Completed,
    Failed,
}

struct Worker {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ScannerTask {
    protocol: Protocol,
    plugin: Arc<dyn ScanPlugin>,
    runner: Arc<dyn ProcessRunner>,
    events: mpsc::UnboundedSender<ScanEvent>,
    state: Arc<watch::Sender<TaskState>>,
    worker: Option<Worker>,
}

impl ScannerTask {
    pub fn new(
        plugin: Arc<dyn ScanPlugin>,
        runner: Arc<dyn ProcessRunner>,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> Self {
        let (state, _) = watch::channel(TaskState::Idle);
        Self {
            protocol: plugin.protocol(),
            plugin,
            runner,
            events,
            state: Arc::new(state),
            worker: None,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    /// Starts a scan of `target`. A rejected target is reported on the event
    /// channel and returned; the current job, if any, is left alone.
    pub async fn run(&mut self, target: Target) -> Result<(), ScanError> {
        if let Err(e) = self.plugin.validate(&target) {
            warn!(protocol = %self.protocol, "refusing target: {e}");
            let _ = self.events.send(ScanEvent::Signal {
                protocol: self.protocol,
                signal: Signal::Error(e.to_string()),
            });
            return Err(e);
        }

        self.cancel().await;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.state.send_replace(TaskState::Running);

        let job = Job {
            protocol: self.protocol,
            plugin: Arc::clone(&self.plugin),
            runner: Arc::clone(&self.runner),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
        };
        let handle = tokio::spawn(job.execute(target, cancel_rx));

        self.worker = Some(Worker {
            cancel: cancel_tx,
            handle,
        });
        Ok(())
    }

    /// Cancels the current job and waits until its process is gone.
    pub async fn cancel(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        if !worker.handle.is_finished() {
            self.state.send_replace(TaskState::Cancelling);
            let _ = worker.cancel.send(());
        }
        if let Err(e) = worker.handle.await {
            warn!(protocol = %self.protocol, "scan job panicked: {e}");
            self.state.send_replace(TaskState::Failed);
        }
    }
}

enum Flow {
    Continue,
    Noise(Noise),
    Halt(String),
}

struct Job {
    protocol: Protocol,
    plugin: Arc<dyn ScanPlugin>,
    runner: Arc<dyn ProcessRunner>,
    events: mpsc::UnboundedSender<ScanEvent>,
    state: Arc<watch::Sender<TaskState>>,
}

impl Job {
    async fn execute(self, target: Target, mut cancel: oneshot::Receiver<()>) {
        let outcome = self.run_stages(&target, &mut cancel).await;

        let state = match outcome {
            Outcome::Completed => TaskState::Completed,
            Outcome::Failed(_) => TaskState::Failed,
            Outcome::Cancelled => TaskState::Idle,
        };
        // State first, so consumers of the final event see the task idle.
        self.state.send_replace(state);
        self.send(ScanEvent::Finished {
            protocol: self.protocol,
            target,
            outcome,
        });
    }

    async fn run_stages(&self, target: &Target, cancel: &mut oneshot::Receiver<()>) -> Outcome {
        let invocations = self.plugin.invocations(target);
        let mut interpreter = self.plugin.interpreter(target);
        let mut exclusion: Vec<String> = Vec::new();
        let mut restarted = false;
        let mut stage = 0;

        while stage < invocations.len() {
            let invocation = invocations[stage].clone().args(exclusion.iter().cloned());
            self.send(ScanEvent::Started {
                protocol: self.protocol,
                target: target.clone(),
                command: invocation.to_string(),
            });
            interpreter.begin_stage(stage);

            let mut handle = self.runner.start(&invocation);
            if let Some(reason) = handle.launch_error() {
                let error = ScanError::LaunchFailure {
                    program: invocation.program.clone(),
                    reason: reason.to_string(),
                };
                self.signal(Signal::Error(error.to_string()));
                return Outcome::Failed(error.to_string());
            }

            let mut flow = Flow::Continue;
            loop {
                tokio::select! {
                    _ = &mut *cancel => {
                        handle.cancel().await;
                        return Outcome::Cancelled;
                    }
                    line = handle.next_line() => {
                        let Some(line) = line else { break };
                        flow = self.forward(interpreter.feed(&line), restarted);
                        if !matches!(flow, Flow::Continue) {
                            break;
                        }
                    }
                }
            }

            match flow {
                Flow::Noise(noise) => {
                    handle.cancel().await;
                    match self.plugin.exclusion_args(&noise) {
                        Some(args) => {
                            restarted = true;
                            self.signal(Signal::Display(format!(
                                "Wildcard responses detected (length {}), restarting with {}",
                                noise.length,
                                args.join(" ")
                            )));
                            exclusion = args;
                            interpreter = self.plugin.interpreter(target);
                            continue;
                        }
                        None => {
                            self.signal(Signal::Error(format!(
                                "Wildcard responses detected (length {}) but no exclusion is available",
                                noise.length
                            )));
                            return Outcome::Failed("noisy responses".into());
                        }
                    }
                }
                Flow::Halt(reason) => {
                    handle.cancel().await;
                    debug!(protocol = %self.protocol, "halted: {reason}");
                    self.forward(interpreter.finish(), true);
                    return Outcome::Failed(reason);
                }
                Flow::Continue => {
                    let code = handle.wait().await;
                    debug!(protocol = %self.protocol, stage, ?code, "stage finished");
                }
            }

            if let Flow::Halt(reason) = self.forward(interpreter.end_stage(stage), true) {
                self.forward(interpreter.finish(), true);
                return Outcome::Failed(reason);
            }
            stage += 1;
        }

        self.forward(interpreter.finish(), true);
        Outcome::Completed
    }

    /// Sends every signal on, holding back the ones that steer the job.
    /// Noise after the single allowed restart is surfaced instead.
    fn forward(&self, signals: Vec<Signal>, restarted: bool) -> Flow {
        let mut flow = Flow::Continue;
        for signal in signals {
            match signal {
                Signal::NoiseTooBroad(noise) if !restarted => {
                    if matches!(flow, Flow::Continue) {
                        flow = Flow::Noise(noise);
                    }
                }
                Signal::NoiseTooBroad(noise) => {
                    self.signal(Signal::Error(format!(
                        "Wildcard responses persist after exclusion (length {}); not restarting again",
                        noise.length
                    )));
                }
                Signal::Halt(reason) => flow = Flow::Halt(reason),
                other => self.signal(other),
            }
        }
        flow
    }

    fn signal(&self, signal: Signal) {
        self.send(ScanEvent::Signal {
            protocol: self.protocol,
            signal,
        });
    }

    fn send(&self, event: ScanEvent) {
        if self.events.send(event).is_err() {
            debug!(protocol = %self.protocol, "event channel closed");
        }
    }
}
