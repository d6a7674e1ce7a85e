use std::net::IpAddr;

use colored::*;
use huntr_common::config::Config;
use huntr_common::hosts::HostResolver;
use huntr_common::{info, success};
use huntr_core::hosts::HostsFile;

use crate::terminal::{colors, print};
use crate::commands::HostsAction;

pub fn hosts(action: HostsAction, cfg: &Config) -> anyhow::Result<()> {
    let store = HostsFile::new(cfg.hosts_file.clone(), cfg.tools.privileged_helper.clone());

    match action {
        HostsAction::Add { ip, name } => {
            let name = huntr_common::target::parse_hostname(&name)?;
            if store.add_entry(ip, &name)? {
                success!("Added {ip} {}", name.color(colors::HOSTNAME));
            } else {
                info!("{ip} {name} is already present");
            }
        }
        HostsAction::Show { ip } => show(&store, ip, cfg)?,
    }
    Ok(())
}

fn show(store: &HostsFile, ip: IpAddr, cfg: &Config) -> anyhow::Result<()> {
    let names = store.names_for(ip)?;
    let domain = store.lookup(ip)?;

    print::header(&format!("names for {ip}"), cfg.quiet);
    if names.is_empty() {
        print::print_status("(none)");
        return Ok(());
    }
    if let Some(domain) = &domain {
        print::aligned_line("domain", 6, domain.as_str().color(colors::HOSTNAME));
    }
    for name in names.iter().filter(|n| Some(*n) != domain.as_ref()) {
        print::aligned_line("name", 6, name.as_str());
    }
    Ok(())
}
