use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Name↔IP mapping store consulted for domains and subdomains.
    pub hosts_file: PathBuf,
    /// Shared username list, one per line.
    pub users_file: PathBuf,
    /// Shared password list, one per line.
    pub passwords_file: PathBuf,
    pub wordlists: Wordlists,
    pub tools: Tools,
    /// Account used for the anonymous-ish RID brute force.
    pub rid_user: String,
    /// How often the subdomain discovery loop re-reads the hosts store.
    pub poll_interval: Duration,
    /// Keep polling for subdomains until interrupted instead of ending the
    /// session once every scanner is idle.
    pub follow: bool,
    pub quiet: u8,
    pub no_banner: bool,
    /// Answer every prompt with its default instead of asking.
    pub disable_input: bool,
}

#[derive(Debug, Clone)]
pub struct Wordlists {
    pub directories: PathBuf,
    pub vhosts: PathBuf,
    pub ftp_defaults: PathBuf,
}

/// Binary names, overridable for non-standard installs.
#[derive(Debug, Clone)]
pub struct Tools {
    pub nmap: String,
    pub gobuster: String,
    pub wfuzz: String,
    pub hydra: String,
    pub netexec: String,
    pub ldapsearch: String,
    pub smbscan: String,
    /// Used to swap a staged hosts file into place when a plain append is
    /// denied.
    pub privileged_helper: String,
    pub gobuster_threads: u16,
    pub wfuzz_threads: u16,
    pub hydra_tasks: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from("/etc/hosts"),
            users_file: PathBuf::from("temp_usernames.txt"),
            passwords_file: PathBuf::from("temp_passwords.txt"),
            wordlists: Wordlists::default(),
            tools: Tools::default(),
            rid_user: String::from("guest"),
            poll_interval: Duration::from_secs(30),
            follow: false,
            quiet: 0,
            no_banner: false,
            disable_input: false,
        }
    }
}

impl Default for Wordlists {
    fn default() -> Self {
        Self {
            directories: PathBuf::from("wordlist/gobuster.txt"),
            vhosts: PathBuf::from(
                "/usr/share/wordlists/seclists/Discovery/DNS/subdomains-top1million-110000.txt",
            ),
            ftp_defaults: PathBuf::from("wordlist/ftp-betterdefaultpasslist.txt"),
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            nmap: String::from("nmap"),
            gobuster: String::from("gobuster"),
            wfuzz: String::from("wfuzz"),
            hydra: String::from("hydra"),
            netexec: String::from("netexec"),
            ldapsearch: String::from("ldapsearch"),
            smbscan: String::from("smbscan"),
            privileged_helper: String::from("sudo"),
            gobuster_threads: 50,
            wfuzz_threads: 100,
            hydra_tasks: 4,
        }
    }
}
