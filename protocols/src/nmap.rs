//! Reads the service discovery report.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

use huntr_common::target::parse_hostname;
use regex::Regex;

static OPEN_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\d+)/tcp\s+open").expect("static regex"));
static REPORT_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Nmap scan report for (?:\S+ \(([^)\s]+)\)|(\S+))").expect("static regex")
});
static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})\b").expect("static regex"));
static REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Did not follow redirect to https?://([^\s/]+)").expect("static regex")
});

/// What a discovery run revealed about the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub ip: Option<IpAddr>,
    /// Domain the web service redirects to, if any.
    pub domain: Option<String>,
    pub open_ports: BTreeSet<u16>,
}

pub fn parse_discovery(output: &str) -> DiscoveryReport {
    let open_ports = OPEN_PORT
        .captures_iter(output)
        .filter_map(|caps| caps[1].parse::<u16>().ok())
        .collect();

    DiscoveryReport {
        ip: report_address(output),
        domain: redirect_domain(output),
        open_ports,
    }
}

fn report_address(output: &str) -> Option<IpAddr> {
    let from_header = REPORT_FOR.captures(output).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<IpAddr>().ok())
    });

    from_header.or_else(|| {
        IPV4.captures_iter(output)
            .find_map(|caps| caps[1].parse::<Ipv4Addr>().ok())
            .map(IpAddr::V4)
    })
}

fn redirect_domain(output: &str) -> Option<String> {
    REDIRECT.captures_iter(output).find_map(|caps| {
        let authority = &caps[1];
        let host = authority.split(':').next().unwrap_or(authority);
        if host.parse::<IpAddr>().is_ok() || host.ends_with("nmap.org") {
            return None;
        }
        parse_hostname(host).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Starting Nmap 7.94SVN ( https://nmap.org ) at 2026-10-19 10:00 UTC
Nmap scan report for 10.10.11.5
Host is up (0.031s latency).

PORT     STATE  SERVICE VERSION
21/tcp   closed ftp
22/tcp   open   ssh     OpenSSH 8.9p1 Ubuntu 3ubuntu0.10
80/tcp   open   http    nginx 1.18.0 (Ubuntu)
|_http-title: Did not follow redirect to http://board.htb:8080/
389/tcp  filtered ldap
Service detection performed. Please report any incorrect results at https://nmap.org/submit/ .
";

    #[test]
    fn parses_ports_address_and_domain() {
        let report = parse_discovery(REPORT);
        assert_eq!(report.ip, Some("10.10.11.5".parse().unwrap()));
        assert_eq!(report.domain.as_deref(), Some("board.htb"));
        assert_eq!(report.open_ports, BTreeSet::from([22, 80]));
    }

    #[test]
    fn prefers_address_in_parentheses() {
        let report = parse_discovery("Nmap scan report for board.htb (10.10.11.7)\n");
        assert_eq!(report.ip, Some("10.10.11.7".parse().unwrap()));
    }

    #[test]
    fn ignores_redirects_to_addresses() {
        let report = parse_discovery("|_http-title: Did not follow redirect to http://10.10.11.5/\n");
        assert_eq!(report.domain, None);
    }

    #[test]
    fn empty_output_yields_empty_report() {
        assert_eq!(parse_discovery(""), DiscoveryReport::default());
    }
}
