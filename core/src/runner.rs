//! The process **abstraction** every scanner is built on.
//!
//! A [`ProcessRunner`] launches one external command and hands back a
//! [`ProcessHandle`] that yields decoded lines from both output streams as
//! they arrive. The [`system`] runner drives real OS processes; tests swap in
//! a recording fake.
//!
//! **Architectural Note:**
//! Launch failures never escape as errors. The handle carries the reason and
//! the caller turns it into a single display line, so a missing binary fails
//! one scan and nothing else.

use huntr_common::process::{Invocation, OutputLine, Stream};
use tokio::sync::{mpsc, oneshot};

mod system;

pub use system::SystemRunner;

pub trait ProcessRunner: Send + Sync {
    fn start(&self, invocation: &Invocation) -> ProcessHandle;
}

/// The caller's end of one running process.
///
/// Dropping the handle kills the process.
pub struct ProcessHandle {
    stdout: Option<mpsc::UnboundedReceiver<String>>,
    stderr: Option<mpsc::UnboundedReceiver<String>>,
    kill: Option<oneshot::Sender<()>>,
    exited: Option<oneshot::Receiver<Option<i32>>>,
    launch_error: Option<String>,
}

enum Next {
    Line(OutputLine),
    Closed(Stream),
}

impl ProcessHandle {
    /// Wires a handle to the given stream receivers. `kill` is fired on
    /// cancellation; `exited` must resolve once the process is gone.
    pub fn new(
        stdout: mpsc::UnboundedReceiver<String>,
        stderr: mpsc::UnboundedReceiver<String>,
        kill: oneshot::Sender<()>,
        exited: oneshot::Receiver<Option<i32>>,
    ) -> Self {
        Self {
            stdout: Some(stdout),
            stderr: Some(stderr),
            kill: Some(kill),
            exited: Some(exited),
            launch_error: None,
        }
    }

    /// A handle for a process that never started. Both streams are already
    /// closed.
    pub fn launch_failure(reason: impl Into<String>) -> Self {
        Self {
            stdout: None,
            stderr: None,
            kill: None,
            exited: None,
            launch_error: Some(reason.into()),
        }
    }

    pub fn launch_error(&self) -> Option<&str> {
        self.launch_error.as_deref()
    }

    /// Next line from either stream, `None` once both have ended. Lines of
    /// one stream keep their order.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        loop {
            let next = match (self.stdout.as_mut(), self.stderr.as_mut()) {
                (None, None) => return None,
                (Some(out), None) => line_or_closed(out.recv().await, Stream::Stdout),
                (None, Some(err)) => line_or_closed(err.recv().await, Stream::Stderr),
                (Some(out), Some(err)) => tokio::select! {
                    line = out.recv() => line_or_closed(line, Stream::Stdout),
                    line = err.recv() => line_or_closed(line, Stream::Stderr),
                },
            };

            match next {
                Next::Line(line) => return Some(line),
                Next::Closed(Stream::Stdout) => self.stdout = None,
                Next::Closed(Stream::Stderr) => self.stderr = None,
            }
        }
    }

    /// Terminates the process and waits until it is gone. Both streams end.
    pub async fn cancel(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
        self.wait().await;
        self.stdout = None;
        self.stderr = None;
    }

    /// Waits for the process to exit and returns its exit code, if any.
    pub async fn wait(&mut self) -> Option<i32> {
        match self.exited.take() {
            Some(exited) => exited.await.ok().flatten(),
            None => None,
        }
    }
}

fn line_or_closed(line: Option<String>, stream: Stream) -> Next {
    match line {
        Some(text) => Next::Line(OutputLine { stream, text }),
        None => Next::Closed(stream),
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
