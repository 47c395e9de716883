// ABOUTME: Connection settings for a remote execution client.
// ABOUTME: Holds the target host, credentials, host key policy, and pool policy.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How the server's host key is checked during the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// The key must already be present in known_hosts.
    #[default]
    Strict,
    /// Unknown keys are accepted and recorded; changed keys are rejected.
    TrustOnFirstUse,
    /// Every key is accepted without verification.
    ///
    /// Anyone able to intercept the connection can impersonate the host.
    /// Only meant for throwaway testnet hosts that are re-provisioned with
    /// fresh host keys on every run.
    InsecureAcceptAny,
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostKeyPolicy::Strict => "strict",
            HostKeyPolicy::TrustOnFirstUse => "trust-on-first-use",
            HostKeyPolicy::InsecureAcceptAny => "insecure-accept-any",
        };
        f.write_str(name)
    }
}

/// How many connections the pool tries to open when a client is built.
///
/// Every attempt is made. Successful connections are kept in the order they
/// were created, and construction only fails when none succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectPolicy {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay after a failed attempt before the next one.
    #[serde(default, with = "humantime_serde")]
    pub backoff: Duration,
}

fn default_attempts() -> u32 {
    2
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff: Duration::ZERO,
        }
    }
}

impl ConnectPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            backoff: Duration::ZERO,
        }
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Configuration for connecting a client to one remote host.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Login user (default: root).
    pub user: String,
    /// Private key used for public key authentication.
    pub key_path: PathBuf,
    pub host_key_policy: HostKeyPolicy,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Bound on TCP connect plus handshake (default: 10 seconds).
    pub connect_timeout: Duration,
    /// Bound on each command; None waits for the remote side.
    pub command_timeout: Option<Duration>,
    pub pool: ConnectPolicy,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: "root".to_string(),
            key_path: key_path.into(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: None,
            pool: ConnectPolicy::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn pool(mut self, policy: ConnectPolicy) -> Self {
        self.pool = policy;
        self
    }
}
