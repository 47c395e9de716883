// ABOUTME: Config scaffolding for new working directories.
// ABOUTME: Creates whiteblock.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const DEFAULT_PRIVATE_KEY: &str = "~/.ssh/id_rsa";

pub fn init_config(dir: &Path, private_key: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let private_key = private_key.unwrap_or(DEFAULT_PRIVATE_KEY);
    if private_key.trim().is_empty() {
        return Err(Error::InvalidConfig(
            "private key path cannot be empty".to_string(),
        ));
    }
    if private_key.contains(['\n', '\r']) {
        return Err(Error::InvalidConfig(
            "private key path cannot span lines".to_string(),
        ));
    }

    // Let the YAML emitter decide on quoting so paths like `*key` or `[a]` survive.
    let private_key = serde_yaml::to_string(private_key)?;
    std::fs::write(&config_path, generate_template_yaml(private_key.trim_end()))?;

    Ok(())
}

fn generate_template_yaml(private_key: &str) -> String {
    format!(
        r#"ssh:
  private_key: {}
  user: root
  port: 22
  # Host key verification: strict (default), trust-on-first-use, or
  # insecure-accept-any. The last one accepts any host key without checking.
  host_key_policy: strict
  connect_timeout: 10s
  pool:
    attempts: 2
    backoff: 0s
"#,
        private_key
    )
}
