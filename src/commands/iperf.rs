// ABOUTME: Iperf command implementation.
// ABOUTME: Runs an iperf3 server and client on two hosts at the same time.

use super::connection::connect;
use whiteblock::config::Config;
use whiteblock::error::Result;
use whiteblock::output::Output;
use whiteblock::ssh::{CommandChain, scp::shell_quote};

/// Measure throughput from `sender` to `receiver`.
///
/// Both hosts run concurrently, each over its own client. A failure on one
/// side does not cancel the other; both results are reported.
pub async fn iperf(config: &Config, sender: &str, receiver: &str, output: &Output) -> Result<()> {
    let server = CommandChain::new().then("iperf3 -s -1");
    // Give the server a moment to start listening.
    let client = CommandChain::new()
        .then("sleep 1")
        .then(format!("iperf3 -c {}", shell_quote(receiver)));

    let (server_result, client_result) = tokio::join!(
        run_on(config, receiver, &server, output),
        run_on(config, sender, &client, output),
    );

    match (server_result, client_result) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(server_error), Err(client_error)) => {
            output.progress(&format!("iperf3 server on {} failed", receiver));
            output.failure(&server_error);
            Err(client_error)
        }
    }
}

async fn run_on(
    config: &Config,
    host: &str,
    chain: &CommandChain,
    output: &Output,
) -> Result<()> {
    let mut client = connect(config, host, output).await?;
    let result = client.run_chain(chain).await;
    client.close().await;

    let combined = result?;
    output.command_output(host, &chain.render()?, &combined);
    Ok(())
}
