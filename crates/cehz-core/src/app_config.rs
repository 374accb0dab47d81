use std::net::SocketAddr;

use crate::portal::PortalConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Table-store target. Present only when the sink is fully configured;
/// a service without one logs extracted records instead of writing them.
#[derive(Clone)]
pub struct SinkConfig {
    pub account: String,
    pub sas_token: String,
    pub table: String,
    /// Service base URL, normally derived from the account name. Tests
    /// point this at a mock server.
    pub endpoint: String,
}

impl SinkConfig {
    /// Default table service endpoint for a storage account.
    #[must_use]
    pub fn default_endpoint(account: &str) -> String {
        format!("https://{account}.table.core.windows.net")
    }
}

impl std::fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfig")
            .field("account", &self.account)
            .field("sas_token", &"[redacted]")
            .field("table", &self.table)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub fetch_timeout_secs: u64,
    pub portal: PortalConfig,
    pub sink: Option<SinkConfig>,
}
