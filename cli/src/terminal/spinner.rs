use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::debug;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

static MULTI: OnceLock<MultiProgress> = OnceLock::new();

/// Every bar and every log line goes through this one draw target so log
/// output never tears a bar.
pub fn multi() -> &'static MultiProgress {
    MULTI.get_or_init(MultiProgress::new)
}

/// Runs `f` with every bar hidden, for anything that talks to the terminal.
pub fn suspended(f: &mut dyn FnMut()) {
    multi().suspend(f)
}

pub fn discovery_spinner(target: &str) -> ProgressBar {
    let pb = multi().add(ProgressBar::new_spinner());
    match ProgressStyle::with_template("{spinner:.blue} {msg}") {
        Ok(style) => pb.set_style(style.tick_strings(TICKS)),
        Err(e) => debug!("spinner template rejected: {e}"),
    }
    pb.set_message(format!(
        "Discovering services on {}...",
        target.green().bold()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// A percentage bar for one scanner.
pub fn scan_bar(label: &str) -> ProgressBar {
    let pb = multi().add(ProgressBar::new(100));
    match ProgressStyle::with_template("{prefix:>9.bright_black} [{bar:30.green/bright_black}] {pos:>3}%") {
        Ok(style) => pb.set_style(style.progress_chars("━╸ ")),
        Err(e) => debug!("progress template rejected: {e}"),
    }
    pb.set_prefix(label.to_string());
    pb
}

pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end();
        let multi = multi();
        if multi.is_hidden() || multi.println(msg).is_err() {
            println!("{msg}");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
