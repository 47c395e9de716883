// ABOUTME: SSH remote execution client for testnet hosts.
// ABOUTME: Pools connections to one host and runs commands, container execs, and file copies.

mod chain;
mod client;
mod config;
mod connection;
pub mod docker;
mod error;
pub mod scp;
mod transport;

pub use chain::CommandChain;
pub use client::{Client, ClientState};
pub use config::{ClientConfig, ConnectPolicy, HostKeyPolicy};
pub use connection::{SshConnection, SshConnector, SshSession};
pub use error::{Error, Result};
pub use transport::{CommandOutput, Connection, Connector, Session};
