// ABOUTME: Run command implementation.
// ABOUTME: Runs commands on a host one by one or as a single chained invocation.

use super::connection::connect;
use whiteblock::config::Config;
use whiteblock::error::Result;
use whiteblock::output::Output;
use whiteblock::ssh::{Client, CommandChain};

/// Run `commands` on `host`.
pub async fn run_commands(
    config: &Config,
    host: &str,
    commands: Vec<String>,
    chain: bool,
    output: &Output,
) -> Result<()> {
    let mut client = connect(config, host, output).await?;

    let result = if chain {
        run_chained(&client, commands, output).await
    } else {
        run_each(&client, &commands, output).await
    };

    client.close().await;
    result
}

async fn run_chained(client: &Client, commands: Vec<String>, output: &Output) -> Result<()> {
    let chain: CommandChain = commands.into_iter().collect();
    let command = chain.render()?;
    let combined = client.run(&command).await?;
    output.command_output(client.host(), &command, &combined);
    Ok(())
}

async fn run_each(client: &Client, commands: &[String], output: &Output) -> Result<()> {
    let results = client.multi_run(commands).await?;
    for (command, result) in commands.iter().zip(&results) {
        output.command_output(client.host(), command, result);
    }
    Ok(())
}
