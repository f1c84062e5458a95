//! sensorgen - ESP32 firmware generator CLI and HTTP API
//!
//! Generates firmware sketches for sensor boards from the builtin catalog,
//! either one-shot on the command line or on demand over HTTP.

mod api;
mod commands;
mod config;
mod server;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sensorgen")]
#[command(about = "ESP32 sensor firmware generator")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensorgen.toml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a firmware sketch
    Generate(commands::GenerateArgs),
    /// List catalog sensors
    Sensors(commands::SensorsArgs),
    /// Print the wiring guide for a set of sensors
    Wiring(commands::WiringArgs),
    /// Print a new random device id
    NewId,
    /// Run the HTTP API
    Serve {
        /// Bind address for web server
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the --config path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so generated sources can be piped from stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Command::InitConfig { path } = &args.command {
        let path = path.as_ref().unwrap_or(&args.config);
        config::save_default_config(path)?;
        info!(path = %path.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Command::Serve { bind: Some(bind) } = &args.command {
        config.server.bind = bind.clone();
    }

    let state = state::AppState::new(config)?;

    match &args.command {
        Command::Generate(cmd) => commands::generate(&state, cmd),
        Command::Sensors(cmd) => commands::sensors(&state, cmd),
        Command::Wiring(cmd) => commands::wiring(&state, cmd),
        Command::NewId => commands::new_id(),
        Command::Serve { .. } => {
            info!("sensorgen v{}", env!("CARGO_PKG_VERSION"));
            let bind = state.config.server.bind.clone();
            let tls = state.config.server.tls.clone();
            server::run(state, &bind, tls.as_ref()).await
        }
        Command::InitConfig { .. } => Ok(()),
    }
}
