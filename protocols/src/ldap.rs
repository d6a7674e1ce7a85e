use huntr_common::events::Signal;
use huntr_common::process::OutputLine;

use crate::{Interpreter, strip_ansi};

/// Directory service enumeration: an nmap script sweep followed by a base
/// `ldapsearch` query. Output is shown raw, prefixed with its stage.
#[derive(Default)]
pub struct DirectoryServiceInterpreter {
    stage: usize,
    collected: Vec<String>,
}

impl DirectoryServiceInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    fn prefix(&self) -> &'static str {
        match self.stage {
            0 => "Nmap: ",
            _ => "LDAP: ",
        }
    }
}

impl Interpreter for DirectoryServiceInterpreter {
    fn begin_stage(&mut self, stage: usize) {
        self.stage = stage;
    }

    fn feed(&mut self, line: &OutputLine) -> Vec<Signal> {
        let text = strip_ansi(&line.text);
        let text = text.trim_end();
        if text.trim().is_empty() {
            return Vec::new();
        }
        let labelled = format!("{}{}", self.prefix(), text);
        self.collected.push(labelled.clone());
        if line.is_stderr() {
            vec![Signal::Error(labelled)]
        } else {
            vec![Signal::Display(labelled)]
        }
    }

    fn finish(&mut self) -> Vec<Signal> {
        vec![Signal::ScanComplete(std::mem::take(&mut self.collected))]
    }
}
