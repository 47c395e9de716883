// ABOUTME: Index of a testnet node running on a host.
// ABOUTME: Maps to the node's container name, `whiteblock-node<N>`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of every node container name.
pub const NODE_CONTAINER_PREFIX: &str = "whiteblock-node";

#[derive(Debug, Error)]
pub enum NodeIndexError {
    #[error("node index cannot be empty")]
    Empty,

    #[error("invalid node index: '{0}'")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn container_name(&self) -> String {
        format!("{}{}", NODE_CONTAINER_PREFIX, self.0)
    }
}

impl From<u32> for NodeIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl FromStr for NodeIndex {
    type Err = NodeIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(NodeIndexError::Empty);
        }
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| NodeIndexError::Invalid(trimmed.to_string()))
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
