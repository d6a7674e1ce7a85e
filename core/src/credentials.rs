use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use huntr_common::credentials::CredentialStore;
use huntr_common::error::ScanError;

/// The two scratch lists brute-force scanners read usernames and passwords
/// from.
pub struct CredentialFiles {
    users: PathBuf,
    passwords: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialFiles {
    pub fn new(users: impl Into<PathBuf>, passwords: impl Into<PathBuf>) -> Self {
        Self {
            users: users.into(),
            passwords: passwords.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn append(&self, path: &Path, value: &str) -> anyhow::Result<()> {
        let value = value.trim_end_matches(['\r', '\n']);
        if value.is_empty() {
            return Ok(());
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("credential file lock poisoned"))?;

        let write = || -> io::Result<()> {
            let needs_newline = fs::read(path)
                .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
                .unwrap_or(false);
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if needs_newline {
                file.write_all(b"\n")?;
            }
            writeln!(file, "{value}")
        };

        write().map_err(|e| {
            ScanError::CredentialWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn read(path: &Path) -> anyhow::Result<Vec<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

impl CredentialStore for CredentialFiles {
    fn append_username(&self, username: &str) -> anyhow::Result<()> {
        self.append(&self.users, username)
    }

    fn append_password(&self, password: &str) -> anyhow::Result<()> {
        self.append(&self.passwords, password)
    }

    fn usernames(&self) -> anyhow::Result<Vec<String>> {
        Self::read(&self.users)
    }

    fn passwords(&self) -> anyhow::Result<Vec<String>> {
        Self::read(&self.passwords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users.txt");
        fs::write(&users, "root").unwrap();
        let store = CredentialFiles::new(&users, dir.path().join("passwords.txt"));

        store.append_username("admin").unwrap();
        store.append_username("").unwrap();
        store.append_password("s3cret").unwrap();

        assert_eq!(store.usernames().unwrap(), vec!["root", "admin"]);
        assert_eq!(store.passwords().unwrap(), vec!["s3cret"]);
    }
}
