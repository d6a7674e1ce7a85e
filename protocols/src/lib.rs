//! # Output Interpreters
//!
//! Every external tool speaks its own line format. An [`Interpreter`] is fed
//! those lines one at a time, in the order the process emitted them, and
//! answers with zero or more [`Signal`]s. Lines matching no known pattern are
//! dropped silently; a parse mismatch is never an error.

use std::sync::LazyLock;

use huntr_common::events::Signal;
use huntr_common::process::OutputLine;
use regex::Regex;

pub mod credentials;
pub mod gobuster;
pub mod ldap;
pub mod nmap;
pub mod rid;
pub mod wfuzz;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("static regex"));

/// Turns raw tool output into structured signals.
///
/// Scans may run several processes one after another ("stages"). The task
/// driving the interpreter announces stage boundaries so multi-stage
/// interpreters can label and post-process each part.
pub trait Interpreter: Send {
    fn begin_stage(&mut self, _stage: usize) {}

    fn feed(&mut self, line: &OutputLine) -> Vec<Signal>;

    fn end_stage(&mut self, _stage: usize) -> Vec<Signal> {
        Vec::new()
    }

    /// Called once after the last stage.
    fn finish(&mut self) -> Vec<Signal>;
}

/// Removes terminal colour and cursor sequences, plus the carriage returns
/// tools use to redraw a line in place.
pub fn strip_ansi(text: &str) -> String {
    let cleaned = ANSI_ESCAPE.replace_all(text, "");
    match cleaned.rfind('\r') {
        Some(idx) => cleaned[idx + 1..].to_string(),
        None => cleaned.into_owned(),
    }
}

/// Completion estimate derived from how many wordlist entries the tool has
/// reported so far.
#[derive(Debug, Clone)]
pub struct Progress {
    total: Option<usize>,
    processed: usize,
    last: Option<u8>,
}

impl Progress {
    pub fn new(total: Option<usize>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            processed: 0,
            last: None,
        }
    }

    /// Counts one more processed entry. Yields a signal only when the
    /// percentage changes.
    pub fn advance(&mut self) -> Option<Signal> {
        self.processed += 1;
        let total = self.total?;
        self.update(self.processed, total)
    }

    /// Uses a tool-reported `done / total` pair instead of the local count.
    pub fn report(&mut self, done: usize, total: usize) -> Option<Signal> {
        if total == 0 {
            return None;
        }
        self.processed = done;
        self.update(done, total)
    }

    fn update(&mut self, done: usize, total: usize) -> Option<Signal> {
        let percent = ((done.saturating_mul(100)) / total).min(100) as u8;
        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);
        Some(Signal::Progress(percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colours_and_redraws() {
        assert_eq!(strip_ansi("\x1b[2K\x1b[32m/admin\x1b[0m"), "/admin");
        assert_eq!(strip_ansi("Progress: 1 / 10\r/login"), "/login");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn progress_only_signals_on_change() {
        let mut progress = Progress::new(Some(200));
        assert_eq!(progress.advance(), Some(Signal::Progress(0)));
        assert_eq!(progress.advance(), Some(Signal::Progress(1)));
        assert_eq!(progress.advance(), None);
        assert_eq!(progress.report(200, 200), Some(Signal::Progress(100)));
    }

    #[test]
    fn progress_without_total_is_silent() {
        let mut progress = Progress::new(None);
        assert_eq!(progress.advance(), None);
        let mut empty = Progress::new(Some(0));
        assert_eq!(empty.advance(), None);
    }
}
