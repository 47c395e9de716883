// ABOUTME: Remote execution client backed by a small pool of connections to one host.
// ABOUTME: Hands out single-use sessions and layers execution strategies on top.

use super::chain::CommandChain;
use super::config::{ClientConfig, ConnectPolicy};
use super::connection::{SshConnection, SshConnector};
use super::docker;
use super::error::{Error, Result};
use super::transport::{CommandOutput, Connection, Connector, Session};
use crate::types::NodeIndex;
use std::path::Path;
use std::time::Duration;

/// Lifecycle of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// At least one connection was established.
    Ready,
    /// `close` was called; no further operations are possible.
    Closed,
}

/// A remote execution client for a single host.
///
/// Connections are kept in creation order and never replaced. A connection
/// that stops working is skipped when sessions are handed out, until the
/// client is closed.
pub struct Client<C: Connection = SshConnection> {
    host: String,
    handles: Vec<C>,
    command_timeout: Option<Duration>,
    state: ClientState,
}

impl<C: Connection> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("handles", &self.handles.len())
            .field("state", &self.state)
            .finish()
    }
}

impl Client<SshConnection> {
    /// Connect to the host described by `config` over SSH.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let policy = config.pool.clone();
        let command_timeout = config.command_timeout;
        let client = Self::connect_with(&SshConnector::new(config), &policy).await?;
        Ok(match command_timeout {
            Some(timeout) => client.with_command_timeout(timeout),
            None => client,
        })
    }
}

impl<C: Connection> Client<C> {
    /// Populate a pool with connections from `connector`.
    ///
    /// Makes `policy.attempts` attempts and keeps every connection that
    /// succeeds. Fails only when all attempts failed, returning the last
    /// attempt's error.
    pub async fn connect_with<K>(connector: &K, policy: &ConnectPolicy) -> Result<Self>
    where
        K: Connector<Connection = C>,
    {
        if policy.attempts == 0 {
            return Err(Error::InvalidPolicy(
                "at least one connection attempt is required".to_string(),
            ));
        }

        let host = connector.host().to_string();
        let mut handles = Vec::new();
        let mut last_error = None;

        for attempt in 1..=policy.attempts {
            match connector.connect().await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(
                        host = %host,
                        attempt,
                        attempts = policy.attempts,
                        "connection attempt failed: {}",
                        e
                    );
                    last_error = Some(e);
                    if attempt < policy.attempts && !policy.backoff.is_zero() {
                        tokio::time::sleep(policy.backoff).await;
                    }
                }
            }
        }

        if let (true, Some(last)) = (handles.is_empty(), last_error) {
            return Err(Error::NoConnections {
                attempts: policy.attempts,
                last: Box::new(last),
            });
        }

        tracing::debug!(host = %host, connections = handles.len(), "client ready");

        Ok(Self {
            host,
            handles,
            command_timeout: None,
            state: ClientState::Ready,
        })
    }

    /// Bound every command run through this client.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Number of pooled connections.
    pub fn connection_count(&self) -> usize {
        self.handles.len()
    }

    /// Get a fresh session from the first connection able to open one.
    pub async fn session(&self) -> Result<C::Session> {
        if self.state == ClientState::Closed {
            return Err(Error::Closed);
        }

        for (index, handle) in self.handles.iter().enumerate() {
            match handle.open_session().await {
                Ok(session) => return Ok(session),
                Err(e) => {
                    tracing::debug!(
                        host = %self.host,
                        connection = index,
                        "session open failed: {}",
                        e
                    );
                }
            }
        }

        Err(Error::NoSessionAvailable)
    }

    /// Run a command and return its combined output.
    ///
    /// A non-zero exit is an error; the output is kept in
    /// `Error::CommandFailed`.
    pub async fn run(&self, command: &str) -> Result<String> {
        self.run_output(command).await?.into_result(command)
    }

    /// Run a command and return its output and exit code, whatever the exit code.
    pub async fn run_output(&self, command: &str) -> Result<CommandOutput> {
        self.execute(command, self.command_timeout).await
    }

    /// Run a command, giving up after `timeout`.
    pub async fn run_with_timeout(&self, command: &str, timeout: Duration) -> Result<String> {
        self.execute(command, Some(timeout))
            .await?
            .into_result(command)
    }

    async fn execute(&self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput> {
        let mut session = self.session().await?;
        tracing::debug!(host = %self.host, command, "running command");

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, session.exec(command))
                .await
                .unwrap_or(Err(Error::CommandTimeout(limit))),
            None => session.exec(command).await,
        };

        release(session).await;
        result
    }

    /// Run each command separately, in order.
    ///
    /// Stops at the first failure; the outputs gathered so far are dropped.
    pub async fn multi_run<I, S>(&self, commands: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outputs = Vec::new();
        for command in commands {
            outputs.push(self.run(command.as_ref()).await?);
        }
        Ok(outputs)
    }

    /// Run the commands as one AND-chained invocation.
    pub async fn fast_multi_run<I, S>(&self, commands: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chain: CommandChain = commands.into_iter().collect();
        self.run_chain(&chain).await
    }

    pub async fn run_chain(&self, chain: &CommandChain) -> Result<String> {
        let command = chain.render()?;
        self.run(&command).await
    }

    /// Run a command inside a node's container.
    pub async fn docker_exec(&self, node: impl Into<NodeIndex>, command: &str) -> Result<String> {
        self.run(&docker::exec(node.into(), command)).await
    }

    /// Start a command inside a node's container without waiting for it.
    pub async fn docker_execd(&self, node: impl Into<NodeIndex>, command: &str) -> Result<String> {
        self.run(&docker::exec_detached(node.into(), command)).await
    }

    /// Read a file from a node's container.
    pub async fn docker_read(&self, node: impl Into<NodeIndex>, path: &str) -> Result<String> {
        self.run(&docker::read_file(node.into(), path)).await
    }

    /// Start several commands inside a node's container, detached and in order.
    pub async fn docker_multi_exec<I, S>(
        &self,
        node: impl Into<NodeIndex>,
        commands: I,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_chain(&docker::multi_exec_detached(node.into(), commands))
            .await
    }

    /// Copy a local file to `destination` on the remote host.
    pub async fn scp(&self, source: impl AsRef<Path>, destination: &str) -> Result<()> {
        let source = source.as_ref();
        let mut session = self.session().await?;
        tracing::debug!(
            host = %self.host,
            source = %source.display(),
            destination,
            "copying file"
        );

        let result = session.send_file(source, destination).await;

        release(session).await;
        result
    }

    /// Close every pooled connection. Calling this again does nothing.
    pub async fn close(&mut self) {
        if self.state == ClientState::Closed {
            return;
        }
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.close().await {
                tracing::warn!(host = %self.host, "failed to close connection: {}", e);
            }
        }
        self.state = ClientState::Closed;
    }
}

async fn release<S: Session>(session: S) {
    if let Err(e) = session.close().await {
        tracing::debug!("session close failed: {}", e);
    }
}
