use std::sync::Arc;

use huntr_common::config::Config;
use huntr_common::error::ScanError;
use huntr_common::events::{Outcome, ScanEvent, Signal};
use huntr_common::protocol::Protocol;
use huntr_common::target::Target;
use huntr_core::registry::ScanRegistry;
use huntr_core::task::TaskState;
use tokio::sync::mpsc;

use crate::support::{Call, FakeRunner, Script, next_finished};

const WILDCARD: &str = "Error: the server returns a status code that matches the provided options for non existing urls. http://board.htb/0b7a9c => 200 (Length: 1337). To continue please exclude the status code or the length";

fn ip_target() -> Target {
    Target::new("10.10.11.5".parse().unwrap())
}

fn named_target() -> Target {
    Target::with_domain("10.10.11.5".parse().unwrap(), "board.htb").unwrap()
}

fn registry(runner: Arc<FakeRunner>) -> (ScanRegistry, mpsc::UnboundedReceiver<ScanEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScanRegistry::new(Arc::new(Config::default()), runner, tx), rx)
}

#[tokio::test]
async fn restart_cancels_previous_process_first() {
    let runner = FakeRunner::new();
    runner.script("hydra", Script::held());
    runner.script("hydra", Script::held());
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::Ssh, ip_target()).await.unwrap();
    registry.run(Protocol::Ssh, ip_target()).await.unwrap();
    assert!(registry.is_running(Protocol::Ssh));

    let first = next_finished(&mut rx).await;
    assert!(matches!(
        first,
        ScanEvent::Finished {
            outcome: Outcome::Cancelled,
            ..
        }
    ));

    registry.shutdown().await;

    let calls = runner.calls();
    assert!(calls.len() >= 3, "unexpected calls: {calls:?}");
    assert!(matches!(&calls[0], Call::Start(inv) if inv.program == "hydra"));
    assert_eq!(calls[1], Call::Cancel("hydra".into()));
    assert!(matches!(&calls[2], Call::Start(inv) if inv.program == "hydra"));
    assert_eq!(registry.state(Protocol::Ssh), TaskState::Idle);
}

#[tokio::test]
async fn noise_restarts_directory_scan_exactly_once() {
    let runner = FakeRunner::new();
    runner.script("gobuster", Script::stderr(&[WILDCARD]));
    runner.script("gobuster", Script::stderr(&[WILDCARD]));
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::DirBust, named_target()).await.unwrap();
    let mut signals = Vec::new();
    let finished = loop {
        match rx.recv().await.unwrap() {
            ScanEvent::Signal { signal, .. } => signals.push(signal),
            event @ ScanEvent::Finished { .. } => break event,
            ScanEvent::Started { .. } => {}
        }
    };

    let starts = runner.starts("gobuster");
    assert_eq!(starts.len(), 2);
    assert!(!starts[0].has_arg("--exclude-length=1337"));
    assert!(starts[1].has_arg("--exclude-length=1337"));

    assert!(signals
        .iter()
        .any(|s| matches!(s, Signal::Error(e) if e.contains("persist"))));
    assert!(!signals.iter().any(|s| matches!(s, Signal::NoiseTooBroad(_))));
    assert!(matches!(
        finished,
        ScanEvent::Finished {
            outcome: Outcome::Completed,
            ..
        }
    ));
    assert_eq!(registry.state(Protocol::DirBust), TaskState::Completed);
}

#[tokio::test]
async fn launch_failure_is_reported_once() {
    let runner = FakeRunner::new();
    runner.script("netexec", Script::missing());
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::Winrm, ip_target()).await.unwrap();

    let mut errors = Vec::new();
    let outcome = loop {
        match rx.recv().await.unwrap() {
            ScanEvent::Signal {
                signal: Signal::Error(e),
                ..
            } => errors.push(e),
            ScanEvent::Finished { outcome, .. } => break outcome,
            _ => {}
        }
    };

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("failed to launch netexec"));
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(registry.state(Protocol::Winrm), TaskState::Failed);
}

#[tokio::test]
async fn invalid_target_is_refused_before_launch() {
    let runner = FakeRunner::new();
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    let result = registry.run(Protocol::VhostFuzz, ip_target()).await;
    assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));
    assert!(runner.calls().is_empty());

    let event = rx.recv().await.unwrap();
    assert!(matches!(
        event,
        ScanEvent::Signal {
            signal: Signal::Error(_),
            ..
        }
    ));
    assert_eq!(registry.state(Protocol::VhostFuzz), TaskState::Idle);
}

#[tokio::test]
async fn missing_python_module_skips_share_enumeration() {
    let runner = FakeRunner::new();
    runner.script(
        "netexec",
        Script::stderr(&["ModuleNotFoundError: No module named 'impacket'"]),
    );
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::Kerberos, ip_target()).await.unwrap();
    let finished = next_finished(&mut rx).await;

    assert!(runner.starts("smbscan").is_empty());
    assert!(matches!(
        finished,
        ScanEvent::Finished {
            outcome: Outcome::Failed(_),
            ..
        }
    ));
}

#[tokio::test]
async fn identity_enumeration_reports_users_then_crawls_shares() {
    let runner = FakeRunner::new();
    runner.script(
        "netexec",
        Script::stdout(&[
            "SMB  10.10.11.5  445  DC01  500: CORP\\Administrator (SidTypeUser)",
            "SMB  10.10.11.5  445  DC01  1103: CORP\\svc_backup (SidTypeUser)",
        ]),
    );
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::Kerberos, ip_target()).await.unwrap();
    let mut users = None;
    loop {
        match rx.recv().await.unwrap() {
            ScanEvent::Signal {
                signal: Signal::UsersFound(found),
                ..
            } => users = Some(found),
            ScanEvent::Finished { .. } => break,
            _ => {}
        }
    }

    assert_eq!(
        users,
        Some(vec!["Administrator".to_string(), "svc_backup".to_string()])
    );
    assert_eq!(runner.starts("smbscan").len(), 1);
}

#[tokio::test]
async fn directory_service_accumulates_both_stages() {
    let runner = FakeRunner::new();
    runner.script("nmap", Script::stdout(&["389/tcp open ldap"]));
    runner.script("ldapsearch", Script::stdout(&["namingContexts: DC=corp,DC=local"]));
    let (mut registry, mut rx) = registry(Arc::clone(&runner));

    registry.run(Protocol::Ldap, ip_target()).await.unwrap();
    let mut complete = Vec::new();
    loop {
        match rx.recv().await.unwrap() {
            ScanEvent::Signal {
                signal: Signal::ScanComplete(lines),
                ..
            } => complete.push(lines),
            ScanEvent::Finished { .. } => break,
            _ => {}
        }
    }

    assert_eq!(
        complete,
        vec![vec![
            "Nmap: 389/tcp open ldap".to_string(),
            "LDAP: namingContexts: DC=corp,DC=local".to_string(),
        ]]
    );
}
