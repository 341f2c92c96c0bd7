//! TCP connection to the OpenOCD telnet console.
//!
//! The console is a line-oriented text channel: commands go out as
//! CRLF-terminated lines, responses come back as free-form terminal output.
//! The connection is an explicit two-state toggle (connected or not), driven
//! by `:connect`/`:disconnect`; there is no automatic reconnect, matching
//! how an operator treats a debug session that just died.
//!
//! Inbound data is handled by a spawned read task: raw bytes are stripped of
//! telnet IAC negotiation, decoded as UTF-8 (lossily, the console is not
//! always clean), sanitized, and forwarded to the event loop as
//! [`TelnetEvent::Data`]. The write half stays with [`TelnetConnection`],
//! which the event loop owns exclusively.

use std::time::Duration;

use ocd_core::text;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that can occur on the telnet control channel.
#[derive(Debug, Error)]
pub enum TelnetError {
    /// The TCP connection could not be established.
    #[error("can not connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// A send was attempted while disconnected.
    #[error("not connected")]
    NotConnected,
    /// An I/O error occurred on the established connection.
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Events emitted by the read task to the event loop.
#[derive(Debug)]
pub enum TelnetEvent {
    /// Sanitized console output ready for display.
    Data(String),
    /// The server closed the connection (or the read failed).
    Closed,
}

/// How long to wait for the TCP handshake before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The telnet control channel to the debug server's console.
///
/// Owned mutably by the event loop; all sends happen from there, so no lock
/// guards the write half.
pub struct TelnetConnection {
    write_half: Option<tokio::net::tcp::OwnedWriteHalf>,
    read_task: Option<JoinHandle<()>>,
    peer: Option<String>,
}

impl TelnetConnection {
    /// Creates a new, unconnected channel.
    pub fn new() -> Self {
        Self {
            write_half: None,
            read_task: None,
            peer: None,
        }
    }

    /// True while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.write_half.is_some()
    }

    /// The `host:port` of the open connection, if any.
    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    /// Opens the connection to `addr` (`host:port`) and spawns the read task.
    ///
    /// An already-open connection is closed first, so `connect` doubles as
    /// the reset-connection primitive.
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::ConnectFailed`] when the TCP connect fails or
    /// times out; the channel stays disconnected in that case.
    pub async fn connect(
        &mut self,
        addr: &str,
        tx: mpsc::Sender<TelnetEvent>,
    ) -> Result<(), TelnetError> {
        self.disconnect().await;

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| TelnetError::ConnectFailed {
                addr: addr.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
            })?
            .map_err(|source| TelnetError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;

        info!("telnet console connected to {addr}");
        let (read_half, write_half) = stream.into_split();
        self.write_half = Some(write_half);
        self.peer = Some(addr.to_string());
        self.read_task = Some(tokio::spawn(read_loop(read_half, tx)));
        Ok(())
    }

    /// Sends one command line, CRLF-terminated.
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::NotConnected`] while disconnected and
    /// [`TelnetError::Io`] when the write fails (the connection is dropped
    /// then).
    pub async fn send_command(&mut self, line: &str) -> Result<(), TelnetError> {
        let writer = self.write_half.as_mut().ok_or(TelnetError::NotConnected)?;

        debug!("console <- {line}");
        let framed = format!("{line}\r\n");
        if let Err(e) = writer.write_all(framed.as_bytes()).await {
            // A failed write means the connection is gone.
            self.disconnect().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Closes the connection. A no-op while disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(mut writer) = self.write_half.take() {
            let _ = writer.shutdown().await;
        }
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        if let Some(peer) = self.peer.take() {
            info!("telnet console to {peer} closed");
        }
    }
}

impl Default for TelnetConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads raw console bytes and forwards sanitized text until EOF.
async fn read_loop(
    mut reader: tokio::net::tcp::OwnedReadHalf,
    tx: mpsc::Sender<TelnetEvent>,
) {
    let mut buf = [0u8; 4096];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let cleaned = text::strip_telnet_iac(&buf[..n]);
                if cleaned.is_empty() {
                    continue;
                }
                let chunk = text::sanitize(&String::from_utf8_lossy(&cleaned));
                if chunk.is_empty() {
                    continue;
                }
                if tx.send(TelnetEvent::Data(chunk)).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("read error on telnet console: {e}");
                break;
            }
        }
    }

    let _ = tx.send(TelnetEvent::Closed).await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
