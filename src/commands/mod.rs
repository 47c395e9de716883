// ABOUTME: Command module aggregator for the whiteblock CLI.
// ABOUTME: Re-exports run, exec, scp, and iperf command handlers.

mod connection;
mod exec;
mod iperf;
mod run;
mod scp;

pub use exec::{exec_command, multi_exec_command, read_command};
pub use iperf::iperf;
pub use run::run_commands;
pub use scp::scp;
