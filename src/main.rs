// ABOUTME: Entry point for the whiteblock CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use whiteblock::config::{self, Config};
use whiteblock::error::Result;
use whiteblock::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli, &output).await {
        output.failure(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let load = || load_config(cli.config.as_deref());

    match cli.command {
        Commands::Init { private_key, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, private_key.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Run {
            host,
            chain,
            commands: to_run,
        } => commands::run_commands(&load()?, &host, to_run, chain, output).await,
        Commands::Exec {
            host,
            node,
            detach,
            command,
        } => commands::exec_command(&load()?, &host, node, command, detach, output).await,
        Commands::MultiExec {
            host,
            node,
            commands: to_start,
        } => commands::multi_exec_command(&load()?, &host, node, to_start, output).await,
        Commands::Read { host, node, file } => {
            commands::read_command(&load()?, &host, node, &file, output).await
        }
        Commands::Scp {
            host,
            source,
            destination,
        } => commands::scp(&load()?, &host, &source, &destination, output).await,
        Commands::Iperf { sender, receiver } => {
            commands::iperf(&load()?, &sender, &receiver, output).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    }
}
