use huntr_common::config::Config;
use huntr_common::process::Invocation;
use huntr_common::target::ScanInput;

/// Ports whose services have a follow-up scanner.
pub const DISCOVERY_PORTS: &str = "21,22,80,88,389,3268,5985";

/// The service discovery scan run once at the start of a session.
pub fn discovery_invocation(input: &ScanInput, cfg: &Config) -> Invocation {
    Invocation::new(&cfg.tools.nmap)
        .args(["-p", DISCOVERY_PORTS, "-A", "-Pn"])
        .arg(input.as_arg())
        .arg("-T5")
}
