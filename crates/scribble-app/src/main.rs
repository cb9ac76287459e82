//! Headless Scribble client (native).
//!
//! Connects to a relay, creates or joins a room, mirrors its strokes onto an
//! in-memory canvas and accepts drawing commands on stdin.

mod commands;

use clap::Parser;
use commands::{Command, HELP, parse_command};
use scribble_core::storage::FileSessionStore;
use scribble_core::tools::PALETTE;
use scribble_core::transport::NativeWebSocket;
use scribble_core::{
    ClientConfig, DrawClient, PointerEvent, RoomState, SessionNotice, TransportError,
};
use scribble_render::{PixmapSurface, RendererError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const FRAME: Duration = Duration::from_millis(16);

/// Join a shared drawing room from the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Relay WebSocket URL (overrides SCRIBBLE_SERVER_URL).
    #[arg(long)]
    server: Option<String>,
    /// Room to join once connected.
    #[arg(long, conflicts_with = "create")]
    room: Option<String>,
    /// Create a new room once connected.
    #[arg(long)]
    create: bool,
    /// Display name. Defaults to a random guest name.
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Canvas background color.
    #[arg(long)]
    background: Option<String>,
    /// Directory holding the remembered room.
    #[arg(long)]
    state_dir: Option<PathBuf>,
    /// Do not remember or restore the room.
    #[arg(long)]
    no_persist: bool,
    /// Write the canvas to this PNG on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(ref server) = self.server {
            config.server_url = server.clone();
        }
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(ref background) = self.background {
            config.background_color = background.clone();
        }
        if let Some(ref dir) = self.state_dir {
            config.state_dir = Some(dir.clone());
        }
        config
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

type Client = DrawClient<NativeWebSocket, PixmapSurface>;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.apply(ClientConfig::from_env());
    let username = cli
        .username
        .clone()
        .unwrap_or_else(|| format!("guest-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));
    log::info!("Starting Scribble as {} against {}", username, config.server_url);

    let local = PixmapSurface::new(config.canvas_width, config.canvas_height)?;
    let remote = PixmapSurface::new(config.canvas_width, config.canvas_height)?;
    let mut socket = NativeWebSocket::new();
    socket.connect(&config.server_url)?;

    let mut client = DrawClient::new(config.background_color.clone(), socket, local, remote);
    if !cli.no_persist {
        let store = match config.state_dir {
            Some(ref dir) => FileSessionStore::new(dir.clone()),
            None => FileSessionStore::default_location(),
        };
        match store {
            Ok(store) => client = client.with_session_store(Box::new(store)),
            Err(e) => log::warn!("Session persistence disabled: {}", e),
        }
    }

    let input = spawn_stdin_reader();
    let mut startup_done = false;

    'frames: loop {
        loop {
            match input.try_recv() {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break 'frames,
                    Ok(Some(cmd)) => execute(&mut client, cmd, &username),
                    Ok(None) => {}
                    Err(e) => eprintln!("{} (try `help`)", e),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'frames,
            }
        }

        for notice in client.pump() {
            report(&client, &notice);
            if notice == SessionNotice::Connected && !startup_done {
                startup_done = true;
                startup(&mut client, cli, &username);
            }
        }

        thread::sleep(FRAME);
    }

    // Flush anything the last commands queued.
    client.pump();
    if let Some(ref path) = cli.snapshot {
        save_snapshot(&client, path)?;
        log::info!("Snapshot written to {}", path.display());
    }
    client.transport_mut().disconnect();
    Ok(())
}

/// Create or join as requested on the command line, unless a remembered
/// room is already being re-joined.
fn startup(client: &mut Client, cli: &Cli, username: &str) {
    if client.session().state() != RoomState::Idle {
        log::info!("Re-joining remembered room; ignoring startup request");
        return;
    }
    let result = if cli.create {
        client.request_create(username)
    } else if let Some(ref room) = cli.room {
        client.request_join(room, username)
    } else {
        return;
    };
    if let Err(e) = result {
        log::warn!("Startup request failed: {}", e);
    }
}

/// Write the local layer composited over the remote layer.
fn save_snapshot(client: &Client, path: &std::path::Path) -> Result<(), RendererError> {
    client
        .remote_surface()
        .composited(client.local_surface())?
        .save_png(path)
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn execute(client: &mut Client, cmd: Command, username: &str) {
    let result = match cmd {
        Command::Create { username: name } => {
            client.request_create(name.as_deref().unwrap_or(username))
        }
        Command::Join { room_id, username: name } => {
            client.request_join(&room_id, name.as_deref().unwrap_or(username))
        }
        Command::Destroy => client.request_destroy(),
        Command::Leave => client.request_leave(),
        Command::Color(color) => {
            client.set_color(&color);
            Ok(())
        }
        Command::Size(size) => client.set_brush_size(size),
        Command::Eraser => {
            client.toggle_eraser();
            let on = client.session().tools().eraser_on;
            println!("eraser {}", if on { "on" } else { "off" });
            Ok(())
        }
        Command::Clear => {
            client.clear();
            Ok(())
        }
        Command::Down(p) => {
            client.enqueue_pointer(PointerEvent::Down(p));
            Ok(())
        }
        Command::Move(p) => {
            client.enqueue_pointer(PointerEvent::Move(p));
            Ok(())
        }
        Command::Up => {
            client.enqueue_pointer(PointerEvent::Up);
            Ok(())
        }
        Command::Out => {
            client.enqueue_pointer(PointerEvent::Leave);
            Ok(())
        }
        Command::Colors => {
            let selected = &client.session().tools().selected_color;
            for color in PALETTE {
                let marker = if color == selected.as_str() { "*" } else { " " };
                println!("{} {}", marker, color);
            }
            Ok(())
        }
        Command::Who => {
            for (name, drawing) in client.session().presence().iter() {
                println!("{}{}", name, if drawing { " (drawing)" } else { "" });
            }
            Ok(())
        }
        Command::Status => {
            let session = client.session();
            println!(
                "{:?} room={} role={:?} local={} remote={}",
                session.state(),
                session.room_id().unwrap_or("-"),
                session.role(),
                session.store().local_paths().len(),
                session.store().remote_paths().len(),
            );
            Ok(())
        }
        Command::Snapshot(path) => {
            match save_snapshot(client, std::path::Path::new(&path)) {
                Ok(()) => println!("wrote {}", path),
                Err(e) => eprintln!("{}", e),
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
    }
}

fn report(client: &Client, notice: &SessionNotice) {
    match notice {
        SessionNotice::Connected => log::info!("Connected"),
        SessionNotice::Disconnected => log::warn!("Disconnected from relay"),
        SessionNotice::RoomCreated { room_id, username } => {
            println!("created room {} as {}", room_id, username);
        }
        SessionNotice::RoomJoined { room_id, username } => {
            println!(
                "joined room {} as {} ({} strokes)",
                room_id,
                username,
                client.session().store().remote_paths().len()
            );
        }
        SessionNotice::RoomDestroyed => println!("room destroyed"),
        SessionNotice::PresenceChanged => {
            let names: Vec<&str> = client.session().presence().usernames().collect();
            log::info!("Online: {}", names.join(", "));
        }
        SessionNotice::RelayError { message } => eprintln!("relay error: {}", message),
    }
}
