mod commands;
mod terminal;

use commands::{CommandLine, Commands, creds, hosts, run, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init(commands.global.verbose);
    print::banner(cfg.no_banner, cfg.quiet);

    match commands.command {
        Commands::Scan { target, .. } => {
            print::header("starting reconnaissance", cfg.quiet);
            scan::scan(target, cfg).await
        }
        Commands::Run {
            protocol,
            ip,
            domain,
        } => {
            print::header(&format!("manual {protocol} scan"), cfg.quiet);
            run::run(protocol, ip, domain, cfg).await
        }
        Commands::Creds { action } => creds::creds(action, &cfg),
        Commands::Hosts { action } => hosts::hosts(action, &cfg),
    }
}
