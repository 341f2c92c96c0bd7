//! Supervision of the openocd server process.
//!
//! The frontend can run the debug server itself: `:server start` spawns
//! `openocd -f <config>` with piped output, and both streams are relayed to
//! the console as [`ServerEvent`]s (sanitized line by line; openocd writes
//! its log to stderr). `:server stop` asks the process to terminate and
//! kills it if it has not exited after one second, the same grace period the
//! original Qt frontend used.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use ocd_core::text;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Errors that can occur while supervising the server process.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server binary could not be spawned.
    #[error("failed to start {binary}: {source}")]
    SpawnFailed {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    /// `:server start` while the server is already running.
    #[error("server is already running")]
    AlreadyRunning,
    /// `:server stop` while no server is running.
    #[error("server is not running")]
    NotRunning,
    /// An I/O error occurred while stopping the process.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Events emitted by the output reader tasks.
#[derive(Debug)]
pub enum ServerEvent {
    /// One sanitized line of server output (stdout or stderr).
    Output(String),
    /// The server's output streams closed; the process is gone or going.
    Terminated,
}

/// Grace period between asking the server to stop and killing it.
const STOP_GRACE: Duration = Duration::from_secs(1);

/// Two-state supervisor for the openocd child process.
pub struct OcdServer {
    child: Option<Child>,
}

impl OcdServer {
    /// Creates a supervisor with no running server.
    pub fn new() -> Self {
        Self { child: None }
    }

    /// True while a server child is held.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Spawns `binary -f config_path` and begins relaying its output.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] if a child is active and
    /// [`ServerError::SpawnFailed`] when the binary cannot be executed.
    pub fn start(
        &mut self,
        binary: &Path,
        config_path: &Path,
        tx: mpsc::Sender<ServerEvent>,
    ) -> Result<(), ServerError> {
        if self.child.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let mut child = Command::new(binary)
            .arg("-f")
            .arg(config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServerError::SpawnFailed {
                binary: binary.display().to_string(),
                source,
            })?;

        info!(
            "started {} -f {}",
            binary.display(),
            config_path.display()
        );

        // The pipes are always present with Stdio::piped.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(relay_output(stdout, tx.clone(), false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(relay_output(stderr, tx, true));
        }

        self.child = Some(child);
        Ok(())
    }

    /// Stops the server: terminate, wait up to one second, then kill.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotRunning`] when no child is active.
    pub async fn stop(&mut self) -> Result<(), ServerError> {
        let mut child = self.child.take().ok_or(ServerError::NotRunning)?;

        terminate(&child);

        match tokio::time::timeout(STOP_GRACE, child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!("server exited with {status}");
            }
            Err(_) => {
                warn!("server ignored terminate; killing it");
                child.kill().await?;
            }
        }
        Ok(())
    }
}

impl Default for OcdServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Asks the child to exit.
///
/// On unix this is SIGTERM, giving openocd the chance to close its probe and
/// listening sockets. Elsewhere there is no portable polite signal, so the
/// grace-period wait in [`OcdServer::stop`] simply expires and the process is
/// killed.
fn terminate(child: &Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The pid came from a live child we own.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    let _ = child;
}

/// Relays one output stream line by line until EOF.
///
/// The `Terminated` marker is sent only for stderr, where openocd logs, so
/// the event loop sees a single end-of-output notice per run.
async fn relay_output(
    stream: impl tokio::io::AsyncRead + Unpin,
    tx: mpsc::Sender<ServerEvent>,
    notify_eof: bool,
) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let cleaned = text::sanitize(&line);
                if tx.send(ServerEvent::Output(cleaned)).await.is_err() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("error reading server output: {e}");
                break;
            }
        }
    }

    if notify_eof {
        let _ = tx.send(ServerEvent::Terminated).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
