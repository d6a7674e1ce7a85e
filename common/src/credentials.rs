/// Defines the contract for the shared credential scratch lists consumed by
/// the credential brute-force scanners.
///
/// Both lists are append-only and must tolerate concurrent appends from
/// several protocols.
pub trait CredentialStore: Send + Sync {
    fn append_username(&self, username: &str) -> anyhow::Result<()>;
    fn append_password(&self, password: &str) -> anyhow::Result<()>;
    fn usernames(&self) -> anyhow::Result<Vec<String>>;
    fn passwords(&self) -> anyhow::Result<Vec<String>>;
}
