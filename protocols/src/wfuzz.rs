//! Virtual host fuzzing output.
//!
//! Almost every guessed host name returns the server's default page. The
//! response shape seen most often is treated as that default ("baseline")
//! and removed, leaving only names the server actually routes somewhere.

use std::net::IpAddr;
use std::sync::LazyLock;

use huntr_common::events::{Baseline, FuzzHit, Signal};
use huntr_common::process::OutputLine;
use huntr_common::target::parse_hostname;
use regex::Regex;

use crate::{Interpreter, Progress, strip_ansi};

static RESULT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\S+\s+)?(\d{3})\s+(\d+)\s+L\s+(\d+)\s+W\s+(\d+)\s+Ch\s+"([^"]+)""#)
        .expect("static regex")
});

pub fn parse_hit(text: &str) -> Option<FuzzHit> {
    let caps = RESULT_LINE.captures(text.trim())?;
    Some(FuzzHit {
        status_code: caps[1].parse().ok()?,
        lines: caps[2].parse().ok()?,
        words: caps[3].parse().ok()?,
        chars: caps[4].parse().ok()?,
        label: caps[5].to_string(),
    })
}

/// Most frequent `(status, words)` pair. Ties go to the pair seen first.
pub fn select_baseline(hits: &[FuzzHit]) -> Option<Baseline> {
    let mut counts: Vec<(u16, u32, usize)> = Vec::new();
    for hit in hits {
        match counts
            .iter_mut()
            .find(|(status, words, _)| *status == hit.status_code && *words == hit.words)
        {
            Some(entry) => entry.2 += 1,
            None => counts.push((hit.status_code, hit.words, 1)),
        }
    }

    let mut best: Option<(u16, u32, usize)> = None;
    for entry in counts {
        if best.is_none_or(|b| entry.2 > b.2) {
            best = Some(entry);
        }
    }

    best.map(|(status_code, words, occurrences)| Baseline {
        status_code,
        words,
        occurrences,
    })
}

/// Drops every hit sharing the baseline's `(status, words)` pair.
pub fn filter_baseline(hits: Vec<FuzzHit>) -> (Option<Baseline>, Vec<FuzzHit>) {
    let Some(baseline) = select_baseline(&hits) else {
        return (None, hits);
    };
    let kept = hits
        .into_iter()
        .filter(|hit| !(hit.status_code == baseline.status_code && hit.words == baseline.words))
        .collect();
    (Some(baseline), kept)
}

pub struct VhostInterpreter {
    domain: String,
    ip: IpAddr,
    hits: Vec<FuzzHit>,
    progress: Progress,
}

impl VhostInterpreter {
    pub fn new(domain: impl Into<String>, ip: IpAddr, wordlist_len: Option<usize>) -> Self {
        Self {
            domain: domain.into(),
            ip,
            hits: Vec::new(),
            progress: Progress::new(wordlist_len),
        }
    }
}

impl Interpreter for VhostInterpreter {
    fn feed(&mut self, line: &OutputLine) -> Vec<Signal> {
        let text = strip_ansi(&line.text);
        if line.is_stderr() {
            let text = text.trim();
            if text.is_empty() {
                return Vec::new();
            }
            return vec![Signal::Error(format!("Error: {text}"))];
        }

        let Some(hit) = parse_hit(&text) else {
            return Vec::new();
        };
        let mut signals = vec![Signal::Display(hit.to_string())];
        signals.extend(self.progress.advance());
        self.hits.push(hit);
        signals
    }

    fn finish(&mut self) -> Vec<Signal> {
        let hits = std::mem::take(&mut self.hits);
        let (baseline, kept) = filter_baseline(hits);

        let mut signals = vec![Signal::Progress(100)];
        let Some(baseline) = baseline else {
            signals.push(Signal::Display("No virtual hosts responded.".into()));
            signals.push(Signal::ScanComplete(Vec::new()));
            return signals;
        };

        signals.push(Signal::DirtyBaseline(baseline));

        let mut summary = Vec::with_capacity(kept.len());
        for hit in &kept {
            match parse_hostname(&format!("{}.{}", hit.label, self.domain)) {
                Ok(name) => {
                    summary.push(format!("{hit} -> {name}"));
                    signals.push(Signal::SubdomainFound { name, ip: self.ip });
                }
                Err(e) => signals.push(Signal::Error(format!("Skipping {hit}: {e}"))),
            }
        }
        signals.push(Signal::ScanComplete(summary));
        signals
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
