// ABOUTME: Compiles a sequence of shell commands into one remote invocation.
// ABOUTME: Each command runs only if the previous one succeeded.

use super::error::{Error, Result};

/// An ordered list of commands joined with the shell's AND operator.
///
/// Commands containing their own control operators (`;`, `&`, `|`, newlines,
/// comments) are wrapped in a brace group so the AND applies to the command
/// as a whole. Brace groups run in the current shell, so `cd` and exported
/// variables carry over to later commands the same way they would when
/// typing the commands one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandChain {
    commands: Vec<String>,
}

impl CommandChain {
    pub const AND: &'static str = " && ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, command: impl Into<String>) -> Self {
        self.push(command);
        self
    }

    pub fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Render the chain as a single shell command line.
    ///
    /// Blank commands are dropped, as a shell would treat them as no-ops.
    pub fn render(&self) -> Result<String> {
        let parts: Vec<String> = self
            .commands
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(group_if_compound)
            .collect();

        if parts.is_empty() {
            return Err(Error::EmptyChain);
        }
        Ok(parts.join(Self::AND))
    }
}

impl<S: Into<String>> FromIterator<S> for CommandChain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn group_if_compound(command: &str) -> String {
    if command.starts_with('#') {
        // A group holding only a comment is a syntax error; `:` gives it a command.
        format!("{{ :; {}\n}}", command)
    } else if command.contains([';', '&', '|', '\n', '#']) {
        // The newline terminates the last command even if it ends in `&`.
        format!("{{ {}\n}}", command)
    } else {
        command.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_simple_commands_with_and() {
        let chain: CommandChain = ["apt-get update", "apt-get install -y iperf3"]
            .into_iter()
            .collect();
        assert_eq!(
            chain.render().unwrap(),
            "apt-get update && apt-get install -y iperf3"
        );
    }

    #[test]
    fn single_command_is_unchanged() {
        let chain = CommandChain::new().then("echo hi");
        assert_eq!(chain.render().unwrap(), "echo hi");
    }

    #[test]
    fn compound_commands_are_grouped() {
        let chain = CommandChain::new()
            .then("cd /tmp; ls")
            .then("cat a | grep b")
            .then("echo done");
        assert_eq!(
            chain.render().unwrap(),
            "{ cd /tmp; ls\n} && { cat a | grep b\n} && echo done"
        );
    }

    #[test]
    fn comment_only_command_gets_a_no_op() {
        let chain = CommandChain::new().then("# note").then("echo x");
        assert_eq!(chain.render().unwrap(), "{ :; # note\n} && echo x");
    }

    #[test]
    fn background_command_stays_valid() {
        let chain = CommandChain::new().then("sleep 5 &").then("echo started");
        assert_eq!(chain.render().unwrap(), "{ sleep 5 &\n} && echo started");
    }

    #[test]
    fn blank_commands_are_skipped() {
        let chain = CommandChain::new().then("  ").then("true").then("");
        assert_eq!(chain.render().unwrap(), "true");
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(CommandChain::new().render(), Err(Error::EmptyChain)));
        let blank: CommandChain = ["", " "].into_iter().collect();
        assert!(matches!(blank.render(), Err(Error::EmptyChain)));
    }
}
