use std::sync::Arc;

use huntr_common::config::Config;
use huntr_common::target::ScanInput;
use huntr_common::{success, warn};
use huntr_core::credentials::CredentialFiles;
use huntr_core::hosts::HostsFile;
use huntr_core::orchestrator::ScanOrchestrator;
use huntr_core::runner::SystemRunner;

use crate::terminal::{print, spinner};
use crate::terminal::reporter::TerminalReporter;

pub async fn scan(input: ScanInput, cfg: Config) -> anyhow::Result<()> {
    if !is_root::is_root() {
        warn!("Not running as root, hosts file updates may ask for a password");
    }

    let mut orchestrator = orchestrator(cfg);
    let target = orchestrator.scan(&input).await?;
    success!("Scanning {target}");

    orchestrator.drive(shutdown_signal()).await?;
    print::end_of_program();
    Ok(())
}

pub fn orchestrator(cfg: Config) -> ScanOrchestrator {
    let reporter = Arc::new(TerminalReporter::new(&cfg));
    let resolver = Arc::new(
        HostsFile::new(cfg.hosts_file.clone(), cfg.tools.privileged_helper.clone())
            .with_prompt_guard(Arc::new(spinner::suspended)),
    );
    let credentials = Arc::new(CredentialFiles::new(
        cfg.users_file.clone(),
        cfg.passwords_file.clone(),
    ));

    ScanOrchestrator::new(
        Arc::new(cfg),
        Arc::new(SystemRunner),
        resolver,
        credentials,
        reporter,
    )
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
