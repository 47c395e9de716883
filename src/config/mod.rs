// ABOUTME: Configuration types and parsing for whiteblock.yml.
// ABOUTME: Handles YAML parsing, file discovery, and SSH settings.

mod env_value;
mod init;
mod ssh;

pub use env_value::EnvValue;
pub use init::init_config;
pub use ssh::SshSettings;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "whiteblock.yml";
pub const CONFIG_FILENAME_ALT: &str = "whiteblock.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".whiteblock/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ssh: SshSettings,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }
}
