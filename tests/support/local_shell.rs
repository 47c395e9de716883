// ABOUTME: Transport double that runs commands through the local shell.
// ABOUTME: Scripts which connections succeed and records every session and command.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use whiteblock::ssh::{CommandOutput, Connection, Connector, Error, Result, Session};

/// Outcome of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// The attempt fails.
    Refuse,
    /// The connection is established and opens sessions.
    Connect,
    /// The connection is established but every session open fails.
    ConnectWithoutSessions,
}

/// Everything the double observed.
#[derive(Debug, Default)]
pub struct Recorder {
    pub connect_attempts: Mutex<usize>,
    /// Connection id for every session open attempt, in order.
    pub session_attempts: Mutex<Vec<usize>>,
    pub sessions_closed: Mutex<usize>,
    /// Connection id for every close, in order.
    pub connections_closed: Mutex<Vec<usize>>,
    /// (connection id, command) for every command executed.
    pub commands: Mutex<Vec<(usize, String)>>,
}

impl Recorder {
    pub fn connect_attempts(&self) -> usize {
        *self.connect_attempts.lock()
    }

    pub fn session_attempts(&self) -> Vec<usize> {
        self.session_attempts.lock().clone()
    }

    pub fn sessions_closed(&self) -> usize {
        *self.sessions_closed.lock()
    }

    pub fn connections_closed(&self) -> Vec<usize> {
        self.connections_closed.lock().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn command_connections(&self) -> Vec<usize> {
        self.commands.lock().iter().map(|(id, _)| *id).collect()
    }
}

pub struct LocalConnector {
    plans: Mutex<VecDeque<Plan>>,
    fallback: Plan,
    recorder: Arc<Recorder>,
}

impl LocalConnector {
    /// Every attempt connects.
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(VecDeque::new()),
            fallback: Plan::Connect,
            recorder: Arc::default(),
        }
    }

    /// Attempts follow `plans` in order; attempts beyond them are refused.
    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self {
            plans: Mutex::new(plans.into_iter().collect()),
            fallback: Plan::Refuse,
            recorder: Arc::default(),
        }
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }
}

#[async_trait]
impl Connector for LocalConnector {
    type Connection = LocalConnection;

    fn host(&self) -> &str {
        "localhost"
    }

    async fn connect(&self) -> Result<LocalConnection> {
        let id = {
            let mut attempts = self.recorder.connect_attempts.lock();
            *attempts += 1;
            *attempts - 1
        };
        let plan = self.plans.lock().pop_front().unwrap_or(self.fallback);

        match plan {
            Plan::Refuse => Err(Error::Connection(format!(
                "connection refused to localhost (attempt {})",
                id
            ))),
            Plan::Connect | Plan::ConnectWithoutSessions => Ok(LocalConnection {
                id,
                opens_sessions: plan == Plan::Connect,
                recorder: Arc::clone(&self.recorder),
            }),
        }
    }
}

pub struct LocalConnection {
    id: usize,
    opens_sessions: bool,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl Connection for LocalConnection {
    type Session = LocalSession;

    async fn open_session(&self) -> Result<LocalSession> {
        self.recorder.session_attempts.lock().push(self.id);
        if !self.opens_sessions {
            return Err(Error::Connection(format!(
                "connection {} cannot open channels",
                self.id
            )));
        }
        Ok(LocalSession {
            connection: self.id,
            used: false,
            recorder: Arc::clone(&self.recorder),
        })
    }

    async fn close(&self) -> Result<()> {
        self.recorder.connections_closed.lock().push(self.id);
        Ok(())
    }
}

pub struct LocalSession {
    connection: usize,
    used: bool,
    recorder: Arc<Recorder>,
}

impl LocalSession {
    fn start(&mut self) -> Result<()> {
        if self.used {
            return Err(Error::SessionSpent);
        }
        self.used = true;
        Ok(())
    }
}

#[async_trait]
impl Session for LocalSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        self.start()?;
        self.recorder
            .commands
            .lock()
            .push((self.connection, command.to_string()));

        // Same shape as a remote exec: one shell, stderr merged into stdout.
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(format!("{{ {}\n}} 2>&1", command))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(255) as u32,
            output: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }

    async fn send_file(&mut self, source: &Path, destination: &str) -> Result<()> {
        self.start()?;
        tokio::fs::copy(source, destination)
            .await
            .map(|_| ())
            .map_err(|e| Error::Transfer(format!("{}: {}", source.display(), e)))
    }

    async fn close(self) -> Result<()> {
        *self.recorder.sessions_closed.lock() += 1;
        Ok(())
    }
}
