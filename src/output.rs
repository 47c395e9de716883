// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet, and JSON output modes.

use crate::error::Error;
use serde::Serialize;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Command output only
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print the combined output of a remote command.
    pub fn command_output(&self, host: &str, command: &str, output: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => print!("{output}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "output",
                host: Some(host),
                command: Some(command),
                message: output,
            }),
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                host: None,
                command: None,
                message,
            }),
        }
    }

    /// Report a failed operation, including whatever the remote command printed.
    pub fn failure(&self, error: &Error) {
        if let Some(remote) = error.remote_output().filter(|o| !o.is_empty()) {
            match self.mode {
                OutputMode::Normal | OutputMode::Quiet if remote.ends_with('\n') => {
                    eprint!("{remote}")
                }
                OutputMode::Normal | OutputMode::Quiet => eprintln!("{remote}"),
                OutputMode::Json => emit_stderr(&JsonEvent {
                    event: "output",
                    host: None,
                    command: None,
                    message: remote,
                }),
            }
        }
        self.error(&error.to_string());
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => emit_stderr(&JsonEvent {
                event: "error",
                host: None,
                command: None,
                message,
            }),
        }
    }
}

fn emit(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

fn emit_stderr(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
    message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_event_includes_host_and_command() {
        let event = JsonEvent {
            event: "output",
            host: Some("10.0.0.2"),
            command: Some("echo hi"),
            message: "hi\n",
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "output");
        assert_eq!(json["host"], "10.0.0.2");
        assert_eq!(json["message"], "hi\n");
    }

    #[test]
    fn success_event_omits_missing_fields() {
        let event = JsonEvent {
            event: "success",
            host: None,
            command: None,
            message: "copied",
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"success","message":"copied"}"#);
    }
}
