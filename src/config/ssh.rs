// ABOUTME: SSH settings section of whiteblock.yml.
// ABOUTME: Resolves the private key path and builds a ClientConfig per host.

use super::env_value::EnvValue;
use crate::error::Result;
use crate::ssh::{ClientConfig, ConnectPolicy, HostKeyPolicy};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SshSettings {
    /// Private key used for every host.
    pub private_key: EnvValue,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    #[serde(default, with = "humantime_serde")]
    pub command_timeout: Option<Duration>,

    #[serde(default)]
    pub pool: ConnectPolicy,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl SshSettings {
    /// Resolve the private key path, expanding a leading `~/`.
    pub fn private_key_path(&self) -> Result<PathBuf> {
        let raw = self.private_key.resolve()?;
        Ok(expand_home(&raw))
    }

    /// Connection settings for `host`.
    pub fn client_config(&self, host: &str) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(host, self.private_key_path()?)
            .port(self.port)
            .user(&self.user)
            .host_key_policy(self.host_key_policy)
            .connect_timeout(self.connect_timeout)
            .pool(self.pool.clone());

        if let Some(path) = &self.known_hosts {
            config = config.known_hosts_path(expand_home(&path.to_string_lossy()));
        }
        if let Some(timeout) = self.command_timeout {
            config = config.command_timeout(timeout);
        }
        Ok(config)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
