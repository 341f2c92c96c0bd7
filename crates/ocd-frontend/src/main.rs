//! ocd-frontend application entry point.
//!
//! Wires together the telnet connection, the openocd supervisor, storage,
//! and the dispatch use case, then runs the Tokio event loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load settings + recent-dir cache + command config
//!  └─ event loop (tokio::select!)
//!       ├─ stdin line          -> parse_line -> Frontend::handle_action
//!       ├─ outbound command    -> TelnetConnection::send_command
//!       ├─ TelnetEvent::Data   -> print sanitized console output
//!       ├─ ServerEvent::Output -> print openocd log line
//!       └─ Ctrl-C              -> shutdown (stop server, store recent dir)
//! ```
//!
//! Commands flow one way: an action resolves templates through
//! [`DispatchUseCase`], which pushes finished lines into an unbounded
//! channel; the loop drains that channel into the socket. This keeps the
//! use case synchronous and testable while the socket stays owned by the
//! loop.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ocd_core::CommandConfig;
use ocd_frontend::application::console::{self, Action};
use ocd_frontend::application::dispatch::{CommandSink, DispatchError, DispatchUseCase};
use ocd_frontend::infrastructure::network::{TelnetConnection, TelnetEvent};
use ocd_frontend::infrastructure::process::{OcdServer, ServerEvent};
use ocd_frontend::infrastructure::storage::{self, Settings};
use ocd_frontend::infrastructure::ui_bridge::{ConnectionStatus, SessionState};

/// Sink feeding dispatched command lines into the event loop's outbound
/// channel.
struct ChannelSink(mpsc::UnboundedSender<String>);

impl CommandSink for ChannelSink {
    fn submit(&mut self, line: &str) -> Result<(), DispatchError> {
        self.0
            .send(line.to_string())
            .map_err(|e| DispatchError::SinkClosed(e.to_string()))
    }
}

/// Whether the event loop keeps running after an action.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Everything the action handler mutates, gathered so the `select!` arms can
/// borrow the receivers separately.
struct Frontend {
    settings: Settings,
    state: SessionState,
    dispatch: DispatchUseCase<ChannelSink>,
    telnet: TelnetConnection,
    server: OcdServer,
    telnet_tx: mpsc::Sender<TelnetEvent>,
    server_tx: mpsc::Sender<ServerEvent>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings come first so they can supply the default log level.
    let settings = storage::load_settings().unwrap_or_else(|e| {
        eprintln!("frontend: settings unusable ({e}); continuing with defaults");
        Settings::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    info!("OpenOCD console frontend starting");

    let mut state = SessionState::new(storage::load_recent_dir());
    state.server_config_path = settings.server_config.clone();

    // Preselected command config; a failure falls back to the defaults.
    let mut config = CommandConfig::default();
    if let Some(path) = &settings.command_config {
        match CommandConfig::load(path) {
            Ok(loaded) => {
                state.command_config_path = Some(path.clone());
                config = loaded;
            }
            Err(e) => warn!("command config not loaded: {e}"),
        }
    }

    let (telnet_tx, mut telnet_rx) = mpsc::channel::<TelnetEvent>(128);
    let (server_tx, mut server_rx) = mpsc::channel::<ServerEvent>(128);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let mut frontend = Frontend {
        settings,
        state,
        dispatch: DispatchUseCase::new(ChannelSink(outbound_tx), config),
        telnet: TelnetConnection::new(),
        server: OcdServer::new(),
        telnet_tx,
        server_tx,
    };

    println!(
        "OpenOCD console frontend (:help for actions, anything else goes to the console)"
    );

    let mut input = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = input.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        if frontend.handle_line(&line).await == Flow::Quit {
                            break;
                        }
                    }
                    // stdin closed; treat like :quit.
                    None => break,
                }
            }

            Some(command) = outbound_rx.recv() => {
                if let Err(e) = frontend.telnet.send_command(&command).await {
                    frontend.state.connection_status = ConnectionStatus::Disconnected;
                    println!("frontend: {e}");
                }
            }

            Some(event) = telnet_rx.recv() => match event {
                TelnetEvent::Data(chunk) => {
                    print!("{chunk}");
                    let _ = std::io::stdout().flush();
                }
                TelnetEvent::Closed => {
                    frontend.telnet.disconnect().await;
                    frontend.state.connection_status = ConnectionStatus::Disconnected;
                    println!("frontend: connection closed by server");
                }
            },

            Some(event) = server_rx.recv() => match event {
                ServerEvent::Output(line) => println!("openocd: {line}"),
                ServerEvent::Terminated => println!("frontend: openocd output closed"),
            },

            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("shutdown signal received");
                break;
            }
        }
    }

    frontend.shutdown().await;
    info!("OpenOCD console frontend stopped");
    Ok(())
}

/// Prints a dispatch failure as one line; success is silent (the console's
/// own response is the feedback).
fn report(result: Result<(), DispatchError>) {
    if let Err(e) = result {
        println!("frontend: {e}");
    }
}

impl Frontend {
    /// Parses and executes one console line.
    async fn handle_line(&mut self, line: &str) -> Flow {
        match console::parse_line(line) {
            Ok(action) => self.handle_action(action).await,
            Err(e) => {
                println!("frontend: {e}");
                Flow::Continue
            }
        }
    }

    async fn handle_action(&mut self, action: Action) -> Flow {
        match action {
            Action::Connect { address } => self.connect(address).await,
            Action::Disconnect => {
                if self.telnet.is_connected() {
                    self.telnet.disconnect().await;
                    self.state.connection_status = ConnectionStatus::Disconnected;
                    println!("frontend: connection closed");
                } else {
                    println!("frontend: not connected");
                }
            }
            Action::ResetConnection => {
                match self.telnet.peer().map(str::to_string) {
                    Some(addr) => {
                        println!("frontend: reset connection");
                        self.connect(Some(addr)).await;
                    }
                    None => println!("frontend: not connected"),
                }
            }

            Action::RamFile(path) => {
                let path = self.state.resolve_path(&path);
                println!("frontend: RAM image {}", path.display());
                self.state.ram_image = Some(path);
            }
            Action::FlashFile(path) => {
                let path = self.state.resolve_path(&path);
                println!("frontend: flash image {}", path.display());
                self.state.flash_image = Some(path);
            }
            Action::Erase(flag) => {
                self.state.erase_before_write = flag;
                println!(
                    "frontend: erase before write {}",
                    if flag { "on" } else { "off" }
                );
            }
            Action::RamLoad(path) => {
                let path = match path {
                    Some(p) => {
                        let p = self.state.resolve_path(&p);
                        self.state.ram_image = Some(p.clone());
                        p
                    }
                    None => match self.state.ram_image.clone() {
                        Some(p) => p,
                        None => {
                            println!("frontend: no RAM image selected (:ramfile <path>)");
                            return Flow::Continue;
                        }
                    },
                };
                report(self.dispatch.ram_load(&path));
            }
            Action::FlashLoad { path, erase } => {
                let path = match path {
                    Some(p) => {
                        let p = self.state.resolve_path(&p);
                        self.state.flash_image = Some(p.clone());
                        p
                    }
                    None => match self.state.flash_image.clone() {
                        Some(p) => p,
                        None => {
                            println!("frontend: no flash image selected (:flashfile <path>)");
                            return Flow::Continue;
                        }
                    },
                };
                let erase = erase.unwrap_or(self.state.erase_before_write);
                report(self.dispatch.flash_load(&path, erase));
            }

            Action::SoftReset => report(self.dispatch.soft_reset()),
            Action::Reset => report(self.dispatch.reset()),
            Action::Halt => report(self.dispatch.halt()),
            Action::Resume => report(self.dispatch.resume()),
            Action::Poll => report(self.dispatch.poll()),
            Action::EraseFlash => report(self.dispatch.erase_flash()),
            Action::FlashProbe => report(self.dispatch.flash_probe()),
            Action::FlashInfo => report(self.dispatch.flash_info()),
            Action::FlashUnlock => report(self.dispatch.flash_unlock()),
            Action::ShowMemory => report(self.dispatch.show_memory()),
            Action::Remap => report(self.dispatch.remap()),
            Action::CpuReset => report(self.dispatch.cpu_reset()),
            Action::PeriphReset => report(self.dispatch.periph_reset()),

            Action::LoadConfig(path) => self.load_config(path),
            Action::SaveConfig(path) => self.save_config(path),
            Action::ServerConfig(path) => self.server_config(path),
            Action::ServerStart => self.server_start(),
            Action::ServerStop => {
                match self.server.stop().await {
                    Ok(()) => println!("frontend: openocd stopped"),
                    Err(e) => println!("frontend: {e}"),
                }
            }

            Action::Help => println!("{}", console::HELP),
            Action::Quit => return Flow::Quit,
            Action::Raw(line) => {
                if !line.is_empty() {
                    report(self.dispatch.raw(&line));
                }
            }
        }
        Flow::Continue
    }

    /// Connects (or reconnects) the telnet console.
    async fn connect(&mut self, address: Option<String>) {
        let addr = address.unwrap_or_else(|| self.settings.console_addr.clone());
        match self.telnet.connect(&addr, self.telnet_tx.clone()).await {
            Ok(()) => {
                self.state.connection_status = ConnectionStatus::Connected;
                println!("frontend: connected to {addr}");
            }
            Err(e) => println!("frontend: {e}"),
        }
    }

    fn load_config(&mut self, path: Option<PathBuf>) {
        let path = match self.config_path(path) {
            Some(p) => p,
            None => return,
        };
        match CommandConfig::load(&path) {
            Ok(config) => {
                self.dispatch.set_config(config);
                self.state.command_config_path = Some(path.clone());
                println!("frontend: command config loaded from {}", path.display());
            }
            Err(e) => println!("frontend: {e}"),
        }
    }

    fn save_config(&mut self, path: Option<PathBuf>) {
        let path = match self.config_path(path) {
            Some(p) => p,
            None => return,
        };
        match self.dispatch.config().save(&path) {
            Ok(()) => {
                self.state.command_config_path = Some(path.clone());
                println!("frontend: command config saved as {}", path.display());
            }
            Err(e) => println!("frontend: {e}"),
        }
    }

    /// Resolves the command-config path for `:loadcfg`/`:savecfg`.
    fn config_path(&mut self, path: Option<PathBuf>) -> Option<PathBuf> {
        let resolved = match path {
            Some(p) => Some(self.state.resolve_path(&p)),
            None => self
                .state
                .command_config_path
                .clone()
                .or_else(|| self.settings.command_config.clone()),
        };
        if resolved.is_none() {
            println!("frontend: no command config selected (:loadcfg <path>)");
        }
        resolved
    }

    fn server_config(&mut self, path: Option<PathBuf>) {
        match path {
            Some(p) => {
                let p = self.state.resolve_path(&p);
                println!("frontend: server config {}", p.display());
                self.state.server_config_path = Some(p);
            }
            None => match &self.state.server_config_path {
                Some(p) => match storage::read_server_config(p) {
                    Ok(text) => print!("{text}"),
                    Err(e) => println!("frontend: {e}"),
                },
                None => println!("frontend: no server config selected (:servercfg <path>)"),
            },
        }
    }

    fn server_start(&mut self) {
        let config = match self
            .state
            .server_config_path
            .clone()
            .or_else(|| self.settings.server_config.clone())
        {
            Some(p) => p,
            None => {
                println!("frontend: no server config selected (:servercfg <path>)");
                return;
            }
        };
        match self.server.start(
            &self.settings.openocd_binary,
            &config,
            self.server_tx.clone(),
        ) {
            Ok(()) => println!("frontend: openocd started"),
            Err(e) => println!("frontend: {e}"),
        }
    }

    /// Stops the server if running, closes the console, persists the
    /// recent-dir cache.
    async fn shutdown(&mut self) {
        if self.server.is_running() {
            if let Err(e) = self.server.stop().await {
                warn!("stopping openocd failed: {e}");
            }
        }
        self.telnet.disconnect().await;
        if let Some(dir) = &self.state.recent_dir {
            storage::store_recent_dir(dir);
        }
    }
}
