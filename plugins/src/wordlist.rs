use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Counts the non-empty entries of a wordlist, for progress estimates.
/// A missing or unreadable list yields `None` and the scan runs without a
/// percentage.
pub fn entry_count(path: &Path) -> Option<usize> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), "Wordlist unavailable: {e}");
            return None;
        }
    };

    let count = BufReader::new(file)
        .split(b'\n')
        .map_while(Result::ok)
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count();
    Some(count)
}
