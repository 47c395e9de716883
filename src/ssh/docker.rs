// ABOUTME: Command strings for running commands inside node containers.
// ABOUTME: Pure string composition; the remote docker CLI does the work.

use super::chain::CommandChain;
use crate::types::NodeIndex;

/// Run `command` in the node's container and wait for it.
pub fn exec(node: NodeIndex, command: &str) -> String {
    format!("docker exec {} {}", node.container_name(), command)
}

/// Start `command` in the node's container without waiting for it.
pub fn exec_detached(node: NodeIndex, command: &str) -> String {
    format!("docker exec -d {} {}", node.container_name(), command)
}

/// Print a file from the node's container.
pub fn read_file(node: NodeIndex, path: &str) -> String {
    exec(node, &format!("cat {}", path))
}

/// Start each command detached, in order.
///
/// The AND join orders the dispatches and stops dispatching once one
/// `docker exec -d` fails (for instance when the container is gone). It says
/// nothing about when the detached processes finish.
pub fn multi_exec_detached<I, S>(node: NodeIndex, commands: I) -> CommandChain
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    commands
        .into_iter()
        .filter(|c| !c.as_ref().trim().is_empty())
        .map(|c| exec_detached(node, c.as_ref()))
        .collect()
}
