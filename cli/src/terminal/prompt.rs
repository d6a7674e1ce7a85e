use std::io;

use colored::*;
use console::Term;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Asks a yes/no question on the terminal. Anything but `y` is a no.
///
/// Writes straight to the terminal instead of through `tracing`: callers
/// suspend the progress bars around this, and the log writer draws through
/// them.
pub fn confirm(question: &str) -> io::Result<bool> {
    let term = Term::stderr();
    term.write_line(&format!(
        "{} {} {}",
        "[?]".magenta().bold(),
        question,
        "[y/N]".bright_black()
    ))?;

    enable_raw_mode()?;
    let answer = read_answer();
    let _ = disable_raw_mode();
    answer
}

fn read_answer() -> io::Result<bool> {
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(false);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter | KeyCode::Esc => {
                return Ok(false);
            }
            _ => {}
        }
    }
}
