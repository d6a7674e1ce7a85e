use std::net::IpAddr;

use huntr_common::config::Config;
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;

use crate::commands::scan::{orchestrator, shutdown_signal};
use crate::terminal::print;

pub async fn run(
    protocol: Protocol,
    ip: IpAddr,
    domain: Option<String>,
    cfg: Config,
) -> anyhow::Result<()> {
    let target = match domain {
        Some(domain) => Target::with_domain(ip, &domain)?,
        None => Target::new(ip),
    };

    let mut orchestrator = orchestrator(cfg);
    if let Err(e) = orchestrator.run_manual(protocol, target).await {
        orchestrator.shutdown().await;
        return Err(e.into());
    }

    orchestrator.drive(shutdown_signal()).await?;
    print::end_of_program();
    Ok(())
}
