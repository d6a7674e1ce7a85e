use colored::*;
use huntr_common::config::Config;
use huntr_common::credentials::CredentialStore;
use huntr_common::success;
use huntr_core::credentials::CredentialFiles;

use crate::commands::CredsAction;
use crate::terminal::{colors, print};

pub fn creds(action: CredsAction, cfg: &Config) -> anyhow::Result<()> {
    let store = CredentialFiles::new(cfg.users_file.clone(), cfg.passwords_file.clone());

    match action {
        CredsAction::AddUser { username } => {
            store.append_username(&username)?;
            success!("Added username {}", username.color(colors::CREDENTIAL));
        }
        CredsAction::AddPass { password } => {
            store.append_password(&password)?;
            success!("Added password {}", password.color(colors::CREDENTIAL));
        }
        CredsAction::List => {
            let usernames = store.usernames()?;
            let passwords = store.passwords()?;

            print::header("usernames", cfg.quiet);
            list(&usernames);
            print::header("passwords", cfg.quiet);
            list(&passwords);
        }
    }
    Ok(())
}

fn list(values: &[String]) {
    if values.is_empty() {
        print::print_status("(empty)");
        return;
    }
    let rows = values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("#{}", i + 1), v.color(colors::CREDENTIAL)))
        .collect();
    print::as_tree_one_level(rows);
}
