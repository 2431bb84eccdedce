//! Config schema types (server, bridge, remote runner, environment URLs).

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GantryConfig {
    pub server: ServerConfig,
    pub bridge: BridgeConfig,
    pub remote: RemoteConfig,
    /// Environment name → deployment-info URL pair. Empty by default; an
    /// instance with no environments rejects every `/deployment-info` query.
    pub environments: BTreeMap<String, EnvironmentUrls>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 4000.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 4000,
        }
    }
}

/// Async-response bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum callback deliveries per webhook; also the channel capacity.
    pub response_limit: usize,
    /// Hard wall-clock ceiling on each producer/consumer pair, in seconds.
    pub response_timeout_secs: u64,
    /// HTTP timeout for a single callback POST, in seconds.
    pub callback_timeout_secs: u64,
    /// Bound on the consumer's final flush after cancellation, in seconds.
    pub flush_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            response_limit: 5,
            response_timeout_secs: 1800,
            callback_timeout_secs: 30,
            flush_timeout_secs: 5,
        }
    }
}

impl BridgeConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }
}

/// Remote deployment-tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Executable that runs deployment operations. Unset disables remote
    /// execution; commands then only report their progress messages.
    pub program: Option<String>,
}

/// Deployment-info endpoints for one environment. Both URLs are required
/// when the environment is declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentUrls {
    pub connect: String,
    pub tpx: String,
}
