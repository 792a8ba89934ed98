//! Resona CLI Client
//!
//! Console client for MPD-style servers, and the reference consumer of
//! the session engine: the main thread is the single-threaded consumer
//! context, pumping the inbox for the reply.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam::channel::bounded;
use tracing_subscriber::{fmt, EnvFilter};

use resona::{Command, Config, Notification, Response, Session, TracingLog};

/// Resona CLI
#[derive(Parser, Debug)]
#[command(name = "resona-cli")]
#[command(about = "Console client for MPD-style audio servers")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(long, default_value = "6600")]
    port: u16,

    /// Server password
    #[arg(long)]
    password: Option<String>,

    /// Seconds to wait for the reply
    #[arg(long, default_value = "10")]
    wait: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show player status
    Status,

    /// Show server statistics
    Stats,

    /// Show the song being played
    Current,

    /// Show the play queue
    Queue,

    /// Show the stored playlists
    Playlists,

    /// Show the output devices
    Outputs,

    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Skip to the next song
    Next,

    /// Skip to the previous song
    Prev,

    /// Set the volume
    Volume {
        /// Volume percentage (0-100)
        volume: i64,
    },
}

impl Commands {
    fn to_command(&self) -> Command {
        match self {
            Commands::Status => Command::Status,
            Commands::Stats => Command::Stats,
            Commands::Current => Command::CurrentSong,
            Commands::Queue => Command::PlaylistInfo,
            Commands::Playlists => Command::ListPlaylists,
            Commands::Outputs => Command::Outputs,
            Commands::Play => Command::Play,
            Commands::Pause => Command::Pause { paused: true },
            Commands::Stop => Command::Stop,
            Commands::Next => Command::Next,
            Commands::Prev => Command::Previous,
            Commands::Volume { volume } => Command::SetVol { volume: *volume },
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,resona=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let mut builder = Config::builder().host(args.host.as_str()).port(args.port);
    if let Some(password) = &args.password {
        builder = builder.password(password.as_str());
    }
    let config = builder.build();

    let (session, inbox) = Session::spawn(config, Arc::new(TracingLog));

    // The reply callback runs on this thread, inside inbox.pump_wait.
    let (reply_tx, reply_rx) = bounded(1);
    if let Err(e) = session.send(args.command.to_command(), move |response| {
        let _ = reply_tx.send(response);
    }) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let deadline = std::time::Instant::now() + Duration::from_secs(args.wait);
    let response = loop {
        inbox.pump_wait(Duration::from_millis(100), |notification| {
            if let Notification::Error(message) = notification {
                eprintln!("error: {message}");
            }
        });

        if let Ok(response) = reply_rx.try_recv() {
            break Some(response);
        }
        if std::time::Instant::now() >= deadline {
            break None;
        }
    };

    let exit_code = match response {
        Some(response) => print_response(&response),
        None => {
            eprintln!("error: no reply within {} seconds", args.wait);
            1
        }
    };

    session.shutdown();
    std::process::exit(exit_code);
}

/// Print one reply; returns the process exit code
fn print_response(response: &Response) -> i32 {
    if let Some(error) = response.status().error() {
        eprintln!("server error: {error}");
        return 1;
    }

    match response {
        Response::Lines { lines, .. } => {
            for line in lines {
                println!("{}", line.raw());
            }
        }
        Response::Entities { blocks, .. } => {
            for block in blocks {
                let title = block.title.as_deref().unwrap_or(&block.uri);
                match block.artist.as_deref() {
                    Some(artist) => println!("{artist} - {title}"),
                    None => println!("{title}"),
                }
            }
        }
    }
    0
}
