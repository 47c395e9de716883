// ABOUTME: Transport traits the client pool is built on.
// ABOUTME: Connector opens connections, connections open single-use sessions.

use super::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Output from a remote command execution.
///
/// Standard output and standard error are merged in the order the remote
/// side produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: u32,
    /// Combined standard output and standard error.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into `Error::CommandFailed`, keeping the output.
    pub fn into_result(self, command: &str) -> Result<String> {
        if self.success() {
            Ok(self.output)
        } else {
            Err(Error::CommandFailed {
                command: command.to_string(),
                exit_code: self.exit_code,
                output: self.output,
            })
        }
    }
}

/// Establishes connections to a single remote host.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Host the connections target, for diagnostics.
    fn host(&self) -> &str;

    async fn connect(&self) -> Result<Self::Connection>;
}

/// One established connection, able to open sessions one after another.
#[async_trait]
pub trait Connection: Send + Sync {
    type Session: Session;

    async fn open_session(&self) -> Result<Self::Session>;

    async fn close(&self) -> Result<()>;
}

/// A single-use execution context: one command or one file transfer.
#[async_trait]
pub trait Session: Send + Sized {
    /// Run a command and wait for it to finish.
    async fn exec(&mut self, command: &str) -> Result<CommandOutput>;

    /// Copy a local file to `destination` on the remote host.
    async fn send_file(&mut self, source: &Path, destination: &str) -> Result<()>;

    async fn close(self) -> Result<()>;
}
