// ABOUTME: Validated domain types.
// ABOUTME: Node indices and the container names derived from them.

mod node_index;

pub use node_index::{NODE_CONTAINER_PREFIX, NodeIndex, NodeIndexError};
