pub mod creds;
pub mod hosts;
pub mod run;
pub mod scan;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use huntr_common::config::Config;
use huntr_common::protocol::Protocol;
use huntr_common::target::ScanInput;

#[derive(Parser)]
#[command(name = "huntr")]
#[command(version, about = "Reconnaissance orchestrator for CTF-style targets.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide headers and raw tool output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Never prompt; every question is answered with its default
    #[arg(long = "no-input", global = true)]
    pub disable_input: bool,

    /// Hosts file used for name lookups and new entries
    #[arg(long, global = true, value_name = "PATH")]
    pub hosts_file: Option<PathBuf>,

    /// Shared username list
    #[arg(long, global = true, value_name = "PATH")]
    pub users_file: Option<PathBuf>,

    /// Shared password list
    #[arg(long, global = true, value_name = "PATH")]
    pub passwords_file: Option<PathBuf>,

    /// Wordlist for directory brute force
    #[arg(long, global = true, value_name = "PATH")]
    pub dir_wordlist: Option<PathBuf>,

    /// Wordlist for virtual host fuzzing
    #[arg(long, global = true, value_name = "PATH")]
    pub vhost_wordlist: Option<PathBuf>,

    /// Seconds between subdomain polls
    #[arg(long, global = true, value_name = "SECS")]
    pub interval: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover services on a host and scan everything found
    #[command(alias = "s")]
    Scan {
        target: ScanInput,
        /// Keep polling for new subdomains until interrupted
        #[arg(short, long)]
        follow: bool,
    },
    /// Run a single scanner against a host
    #[command(alias = "r")]
    Run {
        protocol: Protocol,
        ip: IpAddr,
        /// Address the host by this name
        #[arg(short, long)]
        domain: Option<String>,
    },
    /// Manage the shared credential lists
    #[command(alias = "c")]
    Creds {
        #[command(subcommand)]
        action: CredsAction,
    },
    /// Inspect or extend the hosts file
    #[command(alias = "h")]
    Hosts {
        #[command(subcommand)]
        action: HostsAction,
    },
}

#[derive(Subcommand)]
pub enum CredsAction {
    /// Append a username
    AddUser { username: String },
    /// Append a password
    AddPass { password: String },
    /// Show both lists
    List,
}

#[derive(Subcommand)]
pub enum HostsAction {
    /// Map a name to an address
    Add { ip: IpAddr, name: String },
    /// Show every name mapped to an address
    Show { ip: IpAddr },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut cfg = Config::default();
        let global = &self.global;

        if let Some(path) = &global.hosts_file {
            cfg.hosts_file = path.clone();
        }
        if let Some(path) = &global.users_file {
            cfg.users_file = path.clone();
        }
        if let Some(path) = &global.passwords_file {
            cfg.passwords_file = path.clone();
        }
        if let Some(path) = &global.dir_wordlist {
            cfg.wordlists.directories = path.clone();
        }
        if let Some(path) = &global.vhost_wordlist {
            cfg.wordlists.vhosts = path.clone();
        }
        if let Some(secs) = global.interval {
            cfg.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Commands::Scan { follow, .. } = &self.command {
            cfg.follow = *follow;
        }
        cfg.quiet = global.quiet;
        cfg.no_banner = global.no_banner;
        cfg.disable_input = global.disable_input;
        cfg
    }
}
