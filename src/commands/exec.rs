// ABOUTME: Exec command implementations.
// ABOUTME: Runs commands and reads files inside node containers.

use super::connection::connect;
use whiteblock::config::Config;
use whiteblock::error::Result;
use whiteblock::output::Output;
use whiteblock::ssh::docker;
use whiteblock::types::NodeIndex;

/// Execute a command in a node's container.
pub async fn exec_command(
    config: &Config,
    host: &str,
    node: NodeIndex,
    command: Vec<String>,
    detach: bool,
    output: &Output,
) -> Result<()> {
    let command = command.join(" ");
    let mut client = connect(config, host, output).await?;

    output.progress(&format!("  → Executing in {}...", node.container_name()));
    let result = if detach {
        client.docker_execd(node, &command).await
    } else {
        client.docker_exec(node, &command).await
    };

    client.close().await;

    let remote = if detach {
        docker::exec_detached(node, &command)
    } else {
        docker::exec(node, &command)
    };
    output.command_output(host, &remote, &result?);
    Ok(())
}

/// Start several commands detached in a node's container.
pub async fn multi_exec_command(
    config: &Config,
    host: &str,
    node: NodeIndex,
    commands: Vec<String>,
    output: &Output,
) -> Result<()> {
    let mut client = connect(config, host, output).await?;

    output.progress(&format!(
        "  → Starting {} command(s) in {}...",
        commands.len(),
        node.container_name()
    ));
    let result = client.docker_multi_exec(node, &commands).await;

    client.close().await;

    let combined = result?;
    let remote = docker::multi_exec_detached(node, &commands).render()?;
    output.command_output(host, &remote, &combined);
    Ok(())
}

/// Print a file from a node's container.
pub async fn read_command(
    config: &Config,
    host: &str,
    node: NodeIndex,
    file: &str,
    output: &Output,
) -> Result<()> {
    let mut client = connect(config, host, output).await?;

    let result = client.docker_read(node, file).await;

    client.close().await;
    output.command_output(host, &docker::read_file(node, file), &result?);
    Ok(())
}
