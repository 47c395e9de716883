// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use whiteblock::types::NodeIndex;

#[derive(Parser)]
#[command(name = "whiteblock")]
#[command(about = "Run commands on whiteblock testnet hosts over SSH")]
#[command(version)]
pub struct Cli {
    /// Path to the config file (default: whiteblock.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print command output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of plain text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new whiteblock.yml configuration file
    Init {
        /// Private key used to log in to hosts
        #[arg(long)]
        private_key: Option<String>,

        /// Overwrite an existing whiteblock.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Run commands on a host
    Run {
        /// Host address
        host: String,

        /// Send all commands as one invocation, each running only if the previous succeeded
        #[arg(long)]
        chain: bool,

        /// Commands to run, in order
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Run a command inside a node's container
    Exec {
        /// Host address
        host: String,

        /// Node index (container whiteblock-node<N>)
        node: NodeIndex,

        /// Start the command without waiting for it
        #[arg(short, long)]
        detach: bool,

        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Start several commands detached inside a node's container
    MultiExec {
        /// Host address
        host: String,

        /// Node index (container whiteblock-node<N>)
        node: NodeIndex,

        /// Commands to start, in order
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Print a file from a node's container
    Read {
        /// Host address
        host: String,

        /// Node index (container whiteblock-node<N>)
        node: NodeIndex,

        /// Path inside the container
        file: String,
    },

    /// Copy a local file to a host
    Scp {
        /// Host address
        host: String,

        /// Local file
        source: PathBuf,

        /// Destination path on the host
        destination: String,
    },

    /// Measure throughput between two hosts with iperf3
    Iperf {
        /// Host sending traffic
        sender: String,

        /// Host receiving traffic
        receiver: String,
    },
}
