// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection, session, execution, and file transfer failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("connection to {host} timed out after {timeout:?}")]
    ConnectTimeout { host: String, timeout: Duration },

    #[error("authentication failed: no valid credentials")]
    AuthenticationFailed,

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("failed to establish any of {attempts} connection(s): {last}")]
    NoConnections { attempts: u32, last: Box<Error> },

    #[error("invalid connect policy: {0}")]
    InvalidPolicy(String),

    #[error("unable to get a session")]
    NoSessionAvailable,

    #[error("session already used")]
    SessionSpent,

    #[error("client is closed")]
    Closed,

    #[error("command `{command}` exited with status {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: u32,
        output: String,
    },

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("command chain is empty")]
    EmptyChain,

    #[error("file transfer failed: {0}")]
    Transfer(String),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Key(#[from] russh::keys::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Combined output captured before the failure, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
