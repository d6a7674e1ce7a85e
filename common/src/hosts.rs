use std::net::IpAddr;

/// Defines the contract for the persistent name↔IP mapping store.
///
/// Implementations must only ever append; existing entries are never
/// rewritten.
pub trait HostResolver: Send + Sync {
    /// Finds the root domain mapped to `ip`, i.e. the first name with exactly
    /// one label separator.
    fn lookup(&self, ip: IpAddr) -> anyhow::Result<Option<String>>;

    /// Every name mapped to `ip`, in store order.
    fn names_for(&self, ip: IpAddr) -> anyhow::Result<Vec<String>>;

    /// Whether `name` is already mapped to any address.
    fn contains(&self, name: &str) -> anyhow::Result<bool>;

    /// Appends `ip name`. Returns `false` when the exact entry already exists.
    fn add_entry(&self, ip: IpAddr, name: &str) -> anyhow::Result<bool>;
}

/// Splits a hosts-file line into its address and names, skipping comments
/// and blank lines.
pub fn parse_line(line: &str) -> Option<(IpAddr, Vec<&str>)> {
    let content = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };

    let mut parts = content.split_whitespace();
    let ip = parts.next()?.parse::<IpAddr>().ok()?;
    let names: Vec<&str> = parts.collect();

    if names.is_empty() {
        return None;
    }
    Some((ip, names))
}

/// Counts the label separators of a name.
pub fn dot_count(name: &str) -> usize {
    name.matches('.').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_handles_comments_and_aliases() {
        let (ip, names) = parse_line("10.10.11.5 board.htb crm.board.htb # lab").unwrap();
        assert_eq!(ip.to_string(), "10.10.11.5");
        assert_eq!(names, vec!["board.htb", "crm.board.htb"]);

        assert!(parse_line("# 10.10.11.5 board.htb").is_none());
        assert!(parse_line("10.10.11.5").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("not-an-ip board.htb").is_none());
    }
}
