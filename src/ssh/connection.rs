// ABOUTME: russh-backed implementation of the transport traits.
// ABOUTME: Handles connection, host key checks, authentication, exec, and SCP uploads.

use super::config::{ClientConfig, HostKeyPolicy};
use super::error::{Error, Result};
use super::scp::{self, FileHeader};
use super::transport::{CommandOutput, Connection, Connector, Session};
use async_trait::async_trait;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect, Sig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    fn new(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_key_policy,
            known_hosts_path: config.known_hosts_path.clone(),
        }
    }

    fn check_known_hosts(
        &self,
        key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, russh::keys::Error> {
        match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, key, path),
            None => check_known_hosts(&self.host, self.port, key),
        }
    }

    fn learn(&self, key: &ssh_key::PublicKey) {
        let result = match &self.known_hosts_path {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to save host key to known_hosts: {}", e);
        }
    }

    /// Decide whether the server's key is acceptable under the configured policy.
    fn accepts(&self, key: &ssh_key::PublicKey) -> bool {
        match self.policy {
            HostKeyPolicy::InsecureAcceptAny => {
                tracing::warn!(
                    "host key verification disabled: accepting key for {}:{} unchecked",
                    self.host,
                    self.port
                );
                true
            }
            HostKeyPolicy::Strict => matches!(self.check_known_hosts(key), Ok(true)),
            HostKeyPolicy::TrustOnFirstUse => match self.check_known_hosts(key) {
                Ok(true) => true,
                Ok(false) => {
                    tracing::warn!(
                        "Trust-On-First-Use: accepting unknown host key for {}:{}",
                        self.host,
                        self.port
                    );
                    self.learn(key);
                    true
                }
                Err(russh::keys::Error::KeyChanged { .. }) => false,
                // Unreadable known_hosts is treated as an unknown host.
                Err(_) => true,
            },
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(self.accepts(server_public_key))
    }
}

/// Opens authenticated SSH connections to the configured host.
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: ClientConfig,
}

impl SshConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn load_key(&self) -> Result<Arc<ssh_key::PrivateKey>> {
        let key =
            load_secret_key(&self.config.key_path, None).map_err(|e| Error::KeyLoadFailed {
                path: self.config.key_path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Arc::new(key))
    }

    async fn authenticate(
        &self,
        session: &mut Handle<SshHandler>,
        key: Arc<ssh_key::PrivateKey>,
    ) -> Result<bool> {
        let hash_alg = session
            .best_supported_rsa_hash()
            .await
            .map_err(Error::Protocol)?
            .flatten();

        let result = session
            .authenticate_publickey(&self.config.user, PrivateKeyWithHashAlg::new(key, hash_alg))
            .await
            .map_err(Error::Protocol)?;

        Ok(result.success())
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Connection = SshConnection;

    fn host(&self) -> &str {
        &self.config.host
    }

    async fn connect(&self) -> Result<SshConnection> {
        let config = &self.config;
        let key = self.load_key()?;

        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let connecting = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            SshHandler::new(config),
        );

        let mut handle = tokio::time::timeout(config.connect_timeout, connecting)
            .await
            .map_err(|_| Error::ConnectTimeout {
                host: config.host.clone(),
                timeout: config.connect_timeout,
            })?
            .map_err(|e| {
                if e.to_string().contains("Connection refused") {
                    Error::Connection(format!(
                        "connection refused to {}:{}",
                        config.host, config.port
                    ))
                } else {
                    Error::Connection(e.to_string())
                }
            })?;

        if !self.authenticate(&mut handle, key).await? {
            return Err(Error::AuthenticationFailed);
        }

        tracing::debug!(host = %config.host, port = config.port, "SSH connection established");

        Ok(SshConnection {
            host: config.host.clone(),
            handle,
        })
    }
}

/// An established SSH connection.
pub struct SshConnection {
    host: String,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("host", &self.host)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Connection for SshConnection {
    type Session = SshSession;

    async fn open_session(&self) -> Result<SshSession> {
        let channel = self.handle.channel_open_session().await?;
        Ok(SshSession {
            channel: Some(channel),
        })
    }

    async fn close(&self) -> Result<()> {
        if self.handle.is_closed() {
            return Ok(());
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)
    }
}

/// One SSH channel, used for a single command or upload.
pub struct SshSession {
    channel: Option<Channel<Msg>>,
}

impl SshSession {
    fn take_channel(&mut self) -> Result<Channel<Msg>> {
        self.channel.take().ok_or(Error::SessionSpent)
    }
}

#[async_trait]
impl Session for SshSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.take_channel()?;

        let result = run_on_channel(&mut channel, command).await;
        if let Err(e) = channel.close().await {
            tracing::debug!("closing exec channel: {}", e);
        }
        result
    }

    async fn send_file(&mut self, source: &Path, destination: &str) -> Result<()> {
        let channel = self.take_channel()?;

        let mut file = tokio::fs::File::open(source).await.map_err(|e| {
            Error::Transfer(format!("failed to open {}: {}", source.display(), e))
        })?;
        let metadata = file.metadata().await?;
        let header = FileHeader::for_file(source, &metadata)?;

        channel
            .exec(true, scp::sink_command(destination))
            .await
            .map_err(|e| Error::Transfer(format!("failed to start remote scp: {}", e)))?;

        let mut stream = std::pin::pin!(channel.into_stream());
        scp::send(&mut stream, &mut file, &header).await
    }

    async fn close(mut self) -> Result<()> {
        // exec and send_file consume the channel; this only covers unused sessions.
        match self.channel.take() {
            Some(channel) => channel.close().await.map_err(Error::Protocol),
            None => Ok(()),
        }
    }
}

/// Run a command and collect its combined output and exit status.
async fn run_on_channel(channel: &mut Channel<Msg>, command: &str) -> Result<CommandOutput> {
    channel.exec(true, command).await?;

    let mut output = Vec::new();
    let mut exit_code = 0u32;

    let mut got_exit_status = false;
    let mut got_eof = false;

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                output.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExtendedData { data, .. }) => {
                output.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                exit_code = exit_status;
                got_exit_status = true;
                if got_eof {
                    break;
                }
            }
            Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                tracing::debug!(signal = ?signal_name, command, "remote command killed by signal");
                exit_code = signal_exit_code(&signal_name);
                got_exit_status = true;
                if got_eof {
                    break;
                }
            }
            Some(ChannelMsg::Eof) => {
                got_eof = true;
                if got_exit_status {
                    break;
                }
            }
            Some(ChannelMsg::Close) => {
                break;
            }
            Some(_) => {}
            None => break,
        }
    }

    // No exit status means the channel died (timeout, network issue).
    if !got_exit_status {
        return Err(Error::ChannelClosed);
    }

    Ok(CommandOutput {
        exit_code,
        output: String::from_utf8_lossy(&output).to_string(),
    })
}

/// Exit code a shell reports for a command killed by `signal`.
fn signal_exit_code(signal: &Sig) -> u32 {
    let number = match signal {
        Sig::HUP => 1,
        Sig::INT => 2,
        Sig::QUIT => 3,
        Sig::ILL => 4,
        Sig::ABRT => 6,
        Sig::FPE => 8,
        Sig::KILL => 9,
        Sig::USR1 => 10,
        Sig::SEGV => 11,
        Sig::PIPE => 13,
        Sig::ALRM => 14,
        Sig::TERM => 15,
        Sig::Custom(_) => return 255,
    };
    128 + number
}
