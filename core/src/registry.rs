use std::collections::HashMap;
use std::sync::Arc;

use huntr_common::config::Config;
use huntr_common::error::ScanError;
use huntr_common::events::ScanEvent;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_plugins::for_protocol;
use tokio::sync::mpsc;
use tracing::debug;

use crate::runner::ProcessRunner;
use crate::task::{ScannerTask, TaskState};

/// Hands out the single [`ScannerTask`] of each protocol, creating it on
/// first use.
pub struct ScanRegistry {
    cfg: Arc<Config>,
    runner: Arc<dyn ProcessRunner>,
    events: mpsc::UnboundedSender<ScanEvent>,
    tasks: HashMap<Protocol, ScannerTask>,
}

impl ScanRegistry {
    pub fn new(
        cfg: Arc<Config>,
        runner: Arc<dyn ProcessRunner>,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> Self {
        Self {
            cfg,
            runner,
            events,
            tasks: HashMap::new(),
        }
    }

    pub async fn run(&mut self, protocol: Protocol, target: Target) -> Result<(), ScanError> {
        debug!(%protocol, %target, "run requested");
        self.task(protocol).run(target).await
    }

    pub fn state(&self, protocol: Protocol) -> TaskState {
        self.tasks
            .get(&protocol)
            .map_or(TaskState::Idle, ScannerTask::state)
    }

    pub fn is_running(&self, protocol: Protocol) -> bool {
        matches!(
            self.state(protocol),
            TaskState::Running | TaskState::Cancelling
        )
    }

    pub fn any_running(&self) -> bool {
        self.tasks.keys().any(|p| self.is_running(*p))
    }

    /// Cancels every live task and waits for all of them.
    pub async fn shutdown(&mut self) {
        for task in self.tasks.values_mut() {
            task.cancel().await;
        }
    }

    fn task(&mut self, protocol: Protocol) -> &mut ScannerTask {
        self.tasks.entry(protocol).or_insert_with(|| {
            ScannerTask::new(
                for_protocol(protocol, &self.cfg),
                Arc::clone(&self.runner),
                self.events.clone(),
            )
        })
    }
}
