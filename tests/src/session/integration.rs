use std::collections::BTreeSet;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use huntr_common::config::Config;
use huntr_common::events::{Outcome, Signal};
use huntr_common::protocol::Protocol;
use huntr_common::reporter::AddHostDecision;
use huntr_common::target::{ScanInput, Target};
use huntr_core::credentials::CredentialFiles;
use huntr_core::hosts::HostsFile;
use huntr_core::orchestrator::ScanOrchestrator;

use crate::support::{FakeRunner, RecordingReporter, Script};

const DRIVE_LIMIT: Duration = Duration::from_secs(10);

const DISCOVERY_HTTP_SSH: &[&str] = &[
    "Nmap scan report for 10.10.11.5",
    "PORT   STATE SERVICE VERSION",
    "22/tcp open  ssh     OpenSSH 8.9p1",
    "80/tcp open  http    nginx 1.18.0",
    "|_http-title: Did not follow redirect to http://board.htb/",
];

struct Session {
    _dir: tempfile::TempDir,
    hosts_path: std::path::PathBuf,
    users_path: std::path::PathBuf,
    passwords_path: std::path::PathBuf,
    runner: Arc<FakeRunner>,
    reporter: Arc<RecordingReporter>,
    orchestrator: ScanOrchestrator,
}

fn session(hosts: &str, decision: AddHostDecision) -> Session {
    let dir = tempfile::tempdir().unwrap();
    let hosts_path = dir.path().join("hosts");
    let users_path = dir.path().join("users.txt");
    let passwords_path = dir.path().join("passwords.txt");
    fs::write(&hosts_path, hosts).unwrap();

    let cfg = Config {
        hosts_file: hosts_path.clone(),
        users_file: users_path.clone(),
        passwords_file: passwords_path.clone(),
        poll_interval: Duration::from_millis(50),
        disable_input: true,
        ..Config::default()
    };

    let runner = FakeRunner::new();
    let reporter = RecordingReporter::new(decision);
    let orchestrator = ScanOrchestrator::new(
        Arc::new(cfg),
        runner.clone(),
        Arc::new(HostsFile::new(&hosts_path, "false")),
        Arc::new(CredentialFiles::new(&users_path, &passwords_path)),
        reporter.clone(),
    );

    Session {
        _dir: dir,
        hosts_path,
        users_path,
        passwords_path,
        runner,
        reporter,
        orchestrator,
    }
}

async fn drive(orchestrator: &mut ScanOrchestrator) {
    tokio::time::timeout(DRIVE_LIMIT, orchestrator.drive(std::future::pending()))
        .await
        .expect("session did not settle")
        .unwrap();
}

fn gobuster_hosts(runner: &FakeRunner) -> Vec<String> {
    runner
        .starts("gobuster")
        .iter()
        .filter_map(|inv| {
            inv.args
                .iter()
                .find_map(|a| a.strip_prefix("http://").map(str::to_string))
        })
        .collect()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

#[tokio::test]
async fn http_and_ssh_each_trigger_once() {
    let mut s = session("10.10.11.5 board.htb\n", AddHostDecision::Skip);
    s.runner.script("nmap", Script::stdout(DISCOVERY_HTTP_SSH));

    let input: ScanInput = "10.10.11.5".parse().unwrap();
    let target = s.orchestrator.scan(&input).await.unwrap();
    assert_eq!(target.domain(), Some("board.htb"));
    drive(&mut s.orchestrator).await;

    assert_eq!(s.runner.starts("nmap").len(), 1);
    assert_eq!(s.runner.starts("gobuster").len(), 1);
    assert_eq!(s.runner.starts("wfuzz").len(), 1);
    assert_eq!(s.runner.starts("hydra").len(), 1);
    assert!(s.runner.starts("netexec").is_empty());
    assert!(s.runner.starts("ldapsearch").is_empty());
    assert!(s.reporter.asked().is_empty());
}

#[tokio::test]
async fn directory_service_ports_trigger_one_scan() {
    let mut s = session("", AddHostDecision::Skip);
    s.runner.script(
        "nmap",
        Script::stdout(&[
            "Nmap scan report for 10.10.11.9",
            "389/tcp  open  ldap",
            "3268/tcp open  globalcatLDAP",
        ]),
    );

    let input: ScanInput = "10.10.11.9".parse().unwrap();
    s.orchestrator.scan(&input).await.unwrap();
    drive(&mut s.orchestrator).await;

    assert_eq!(s.runner.starts("ldapsearch").len(), 1);
    assert_eq!(s.reporter.outcomes(Protocol::Ldap), vec![Outcome::Completed]);
}

#[tokio::test]
async fn unknown_domain_is_offered_and_declined() {
    let mut s = session("", AddHostDecision::Skip);
    s.runner.script("nmap", Script::stdout(DISCOVERY_HTTP_SSH));

    let input: ScanInput = "10.10.11.5".parse().unwrap();
    let target = s.orchestrator.scan(&input).await.unwrap();
    drive(&mut s.orchestrator).await;

    assert_eq!(target, Target::new("10.10.11.5".parse().unwrap()));
    assert_eq!(
        s.reporter.asked(),
        vec![("10.10.11.5".parse::<IpAddr>().unwrap(), "board.htb".to_string())]
    );
    assert_eq!(gobuster_hosts(&s.runner), vec!["10.10.11.5"]);
    assert!(s.runner.starts("wfuzz").is_empty());
    assert_eq!(read(&s.hosts_path), "");
}

#[tokio::test]
async fn subdomains_are_scanned_sequentially_and_once() {
    let mut s = session(
        "10.10.11.5 board.htb\n10.10.11.5 crm.board.htb\n",
        AddHostDecision::Add,
    );
    s.runner.script(
        "nmap",
        Script::stdout(&["Nmap scan report for 10.10.11.5", "80/tcp open http"]),
    );
    s.runner.script(
        "wfuzz",
        Script::stdout(&[
            "000000001:   302   7 L   10 W   154 Ch   \"www\"",
            "000000002:   302   7 L   10 W   154 Ch   \"mail\"",
            "000000003:   302   7 L   10 W   154 Ch   \"ftp\"",
            "000000004:   200   120 L   388 W   5120 Ch   \"dev\"",
        ]),
    );

    let input: ScanInput = "10.10.11.5".parse().unwrap();
    s.orchestrator.scan(&input).await.unwrap();
    drive(&mut s.orchestrator).await;

    let scanned: Vec<String> = gobuster_hosts(&s.runner);
    let unique: BTreeSet<&String> = scanned.iter().collect();
    assert_eq!(scanned.len(), unique.len(), "a host was scanned twice: {scanned:?}");
    assert_eq!(
        unique,
        BTreeSet::from([
            &"board.htb".to_string(),
            &"crm.board.htb".to_string(),
            &"dev.board.htb".to_string(),
        ])
    );
    assert_eq!(scanned[0], "board.htb");

    assert!(read(&s.hosts_path).contains("10.10.11.5 dev.board.htb"));
    assert!(s
        .reporter
        .signals(Protocol::VhostFuzz)
        .iter()
        .any(|sig| matches!(sig, Signal::DirtyBaseline(b) if b.words == 10)));
    assert!(s.orchestrator.discovery().unwrap().pending() == 0);
}

#[tokio::test]
async fn credentials_are_persisted_for_later_scans() {
    let mut s = session("", AddHostDecision::Skip);
    s.runner.script(
        "hydra",
        Script::stdout(&["[22][ssh] host: 10.10.11.5   login: admin   password: s3cret"]),
    );
    s.runner.script(
        "netexec",
        Script::stdout(&["SMB  10.10.11.5  445  DC01  1103: CORP\\svc_backup (SidTypeUser)"]),
    );

    let ip: IpAddr = "10.10.11.5".parse().unwrap();
    s.orchestrator.run_manual(Protocol::Ssh, Target::new(ip)).await.unwrap();
    s.orchestrator
        .run_manual(Protocol::Kerberos, Target::new(ip))
        .await
        .unwrap();
    drive(&mut s.orchestrator).await;

    let users = read(&s.users_path);
    assert!(users.lines().any(|l| l == "admin"));
    assert!(users.lines().any(|l| l == "svc_backup"));
    assert_eq!(read(&s.passwords_path), "s3cret\n");
    assert!(s
        .reporter
        .notices()
        .iter()
        .any(|n| n == "Saved 1 usernames to the username list"));
}

#[tokio::test]
async fn unwritable_username_list_is_not_reported_as_saved() {
    let mut s = session("", AddHostDecision::Skip);
    fs::create_dir(&s.users_path).unwrap();
    s.runner.script(
        "netexec",
        Script::stdout(&["SMB  10.10.11.5  445  DC01  1103: CORP\\svc_backup (SidTypeUser)"]),
    );

    let ip: IpAddr = "10.10.11.5".parse().unwrap();
    s.orchestrator
        .run_manual(Protocol::Kerberos, Target::new(ip))
        .await
        .unwrap();
    drive(&mut s.orchestrator).await;

    assert!(s
        .reporter
        .signals(Protocol::Kerberos)
        .iter()
        .any(|sig| matches!(sig, Signal::UsersFound(users) if users == &["svc_backup"])));
    assert!(!s.reporter.notices().iter().any(|n| n.starts_with("Saved")));
}

#[tokio::test]
async fn malformed_virtual_host_never_reaches_the_hosts_file() {
    let mut s = session("10.10.11.5 board.htb\n", AddHostDecision::Add);
    s.runner.script(
        "nmap",
        Script::stdout(&["Nmap scan report for 10.10.11.5", "80/tcp open http"]),
    );
    s.runner.script(
        "wfuzz",
        Script::stdout(&[
            "000000001:   302   7 L   10 W   154 Ch   \"www\"",
            "000000002:   302   7 L   10 W   154 Ch   \"mail\"",
            "000000003:   200   30 L   90 W   900 Ch   \"evil board.htb\"",
        ]),
    );

    let input: ScanInput = "10.10.11.5".parse().unwrap();
    s.orchestrator.scan(&input).await.unwrap();
    drive(&mut s.orchestrator).await;

    assert_eq!(read(&s.hosts_path), "10.10.11.5 board.htb\n");
    assert!(s.reporter.asked().is_empty());
    assert_eq!(gobuster_hosts(&s.runner), vec!["board.htb"]);
    assert!(s
        .reporter
        .signals(Protocol::VhostFuzz)
        .iter()
        .any(|sig| matches!(sig, Signal::Error(e) if e.contains("evil board.htb"))));
}

#[tokio::test]
async fn failing_tool_does_not_stop_siblings() {
    let mut s = session("10.10.11.5 board.htb\n", AddHostDecision::Skip);
    s.runner.script("nmap", Script::stdout(DISCOVERY_HTTP_SSH));
    s.runner.script("hydra", Script::missing());

    let input: ScanInput = "10.10.11.5".parse().unwrap();
    s.orchestrator.scan(&input).await.unwrap();
    drive(&mut s.orchestrator).await;

    assert!(matches!(
        s.reporter.outcomes(Protocol::Ssh).as_slice(),
        [Outcome::Failed(_)]
    ));
    assert_eq!(
        s.reporter.outcomes(Protocol::DirBust),
        vec![Outcome::Completed]
    );
    assert_eq!(
        s.reporter.outcomes(Protocol::VhostFuzz),
        vec![Outcome::Completed]
    );
}

#[tokio::test]
async fn interrupt_cancels_running_scans() {
    let mut s = session("", AddHostDecision::Skip);
    s.runner.script("hydra", Script::held());

    let ip: IpAddr = "10.10.11.5".parse().unwrap();
    s.orchestrator.run_manual(Protocol::Ssh, Target::new(ip)).await.unwrap();

    tokio::time::timeout(
        DRIVE_LIMIT,
        s.orchestrator.drive(tokio::time::sleep(Duration::from_millis(100))),
    )
    .await
    .expect("shutdown hung")
    .unwrap();

    assert_eq!(s.reporter.outcomes(Protocol::Ssh), vec![Outcome::Cancelled]);
    assert!(!s.orchestrator.registry().any_running());
    assert!(s
        .reporter
        .notices()
        .iter()
        .any(|n| n.starts_with("Interrupted")));
}
