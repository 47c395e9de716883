// ABOUTME: Scp command implementation.
// ABOUTME: Copies a local file to a host.

use super::connection::connect;
use std::path::Path;
use whiteblock::config::Config;
use whiteblock::error::Result;
use whiteblock::output::Output;

/// Copy `source` to `destination` on `host`.
pub async fn scp(
    config: &Config,
    host: &str,
    source: &Path,
    destination: &str,
    output: &Output,
) -> Result<()> {
    let mut client = connect(config, host, output).await?;

    output.progress(&format!("  → Copying {}...", source.display()));
    let result = client.scp(source, destination).await;

    client.close().await;
    result?;

    output.success(&format!(
        "Copied {} to {}:{}",
        source.display(),
        host,
        destination
    ));
    Ok(())
}
