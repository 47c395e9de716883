// ABOUTME: Library root for whiteblock - exposes the remote execution client.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod output;
pub mod ssh;
pub mod types;
