// ABOUTME: Shared helper for connecting to a host from a CLI command.
// ABOUTME: Eliminates duplication across run, exec, scp, and iperf commands.

use whiteblock::config::Config;
use whiteblock::error::Result;
use whiteblock::output::Output;
use whiteblock::ssh::Client;

/// Connect to `host` with the configured SSH settings.
///
/// Callers close the returned client once they are done, on success and
/// on error.
pub async fn connect(config: &Config, host: &str, output: &Output) -> Result<Client> {
    output.progress(&format!("  → Connecting to {}...", host));
    let client = Client::connect(config.ssh.client_config(host)?).await?;
    output.progress(&format!(
        "  → Connected ({} connection(s))",
        client.connection_count()
    ));
    Ok(client)
}
