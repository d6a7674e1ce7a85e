//! Directory brute-force output.
//!
//! Gobuster refuses to continue when the server answers every path with the
//! same status code. That refusal carries the response length, which is all
//! the scanner needs to restart with `--exclude-length`.

use std::sync::LazyLock;

use huntr_common::events::{Noise, Signal};
use huntr_common::process::OutputLine;
use regex::Regex;
use tracing::trace;

use crate::{Interpreter, Progress, strip_ansi};

const NOISE_MARKER: &str = "the server returns a status code that matches the provided options";
const SUMMARY_RULE: &str = "============================================================";

static PROGRESS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Progress:\s*(\d+)\s*/\s*(\d+)").expect("static regex"));
static NOISE_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Length:\s*(\d+)").expect("static regex"));
static NOISE_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=>\s*(\d{3})").expect("static regex"));

pub struct DirectoryInterpreter {
    progress: Progress,
    results: Vec<String>,
}

impl DirectoryInterpreter {
    pub fn new(wordlist_len: Option<usize>) -> Self {
        Self {
            progress: Progress::new(wordlist_len),
            results: Vec::new(),
        }
    }
}

impl Interpreter for DirectoryInterpreter {
    fn feed(&mut self, line: &OutputLine) -> Vec<Signal> {
        let cleaned = strip_ansi(&line.text);
        let text = cleaned.trim();
        if text.is_empty() {
            return Vec::new();
        }

        if let Some(caps) = PROGRESS_LINE.captures(text) {
            let done = caps[1].parse::<usize>().unwrap_or(0);
            let total = caps[2].parse::<usize>().unwrap_or(0);
            return self.progress.report(done, total).into_iter().collect();
        }

        if text.contains(NOISE_MARKER) {
            return match parse_noise(text) {
                Some(noise) => vec![Signal::NoiseTooBroad(noise)],
                None => vec![Signal::Error(text.to_string())],
            };
        }

        if line.is_stderr() {
            trace!(line = text, "gobuster stderr");
            return vec![Signal::Error(as_error(text))];
        }

        self.results.push(text.to_string());
        let mut signals = vec![Signal::Display(text.to_string())];
        signals.extend(self.progress.advance());
        signals
    }

    fn finish(&mut self) -> Vec<Signal> {
        let findings = self.results.iter().filter(|line| is_finding(line));

        let mut summary = vec![
            SUMMARY_RULE.to_string(),
            "Directory Scan Results Summary".to_string(),
            SUMMARY_RULE.to_string(),
        ];
        summary.extend(findings.cloned());
        summary.push(SUMMARY_RULE.to_string());

        vec![Signal::Progress(100), Signal::ScanComplete(summary)]
    }
}

/// Pulls the offending response length (and status, when present) out of
/// gobuster's wildcard-response error.
pub fn parse_noise(text: &str) -> Option<Noise> {
    let length = NOISE_LENGTH.captures(text)?[1].parse::<u64>().ok()?;
    let status_code = NOISE_STATUS
        .captures(text)
        .and_then(|caps| caps[1].parse::<u16>().ok());
    Some(Noise {
        status_code,
        length,
    })
}

fn is_finding(line: &str) -> bool {
    line.starts_with('/') || line.contains("(Status:")
}

fn as_error(text: &str) -> String {
    if text.starts_with("Error:") {
        text.to_string()
    } else {
        format!("Error: {text}")
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
