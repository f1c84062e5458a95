//! CLI subcommand implementations

use anyhow::{Context, Result};
use clap::Args;
use sensorgen_core::{
    DeviceId, GeneratedProgram, GenerationRequest, NetworkCredentials, SensorCategory, SensorQuery,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Device id embedded into the firmware (e.g., MACHINE-33FZTIH1)
    pub device_id: String,

    /// Sensor to enable, repeatable; order is kept
    #[arg(short, long = "sensor")]
    pub sensors: Vec<String>,

    /// WiFi network name
    #[arg(long)]
    pub ssid: Option<String>,

    /// WiFi password
    #[arg(long)]
    pub password: Option<String>,

    /// Realtime database API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Realtime database URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// Generate random readings instead of reading hardware
    /// (`--simulate=false` overrides a configured default)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub simulate: Option<bool>,

    /// Keep legacy database calls in send fragments
    #[arg(long)]
    pub no_upgrade_send: bool,

    /// Output file or directory (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    fn to_request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.device_id)
            .with_credentials(NetworkCredentials {
                wifi_ssid: self.ssid.clone(),
                wifi_password: self.password.clone(),
                api_key: self.api_key.clone(),
                database_url: self.database_url.clone(),
            });
        request.simulation = self.simulate;
        for id in &self.sensors {
            request.enable(id.as_str());
        }
        request
    }
}

#[derive(Args, Debug)]
pub struct SensorsArgs {
    /// Only list sensors in this category
    #[arg(long)]
    pub category: Option<SensorCategory>,

    /// Case-insensitive text to match against label or id
    #[arg(long)]
    pub search: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WiringArgs {
    /// Sensor to include, repeatable; order is kept
    #[arg(short, long = "sensor")]
    pub sensors: Vec<String>,
}

/// Generate firmware and print or save it
pub fn generate(state: &AppState, args: &GenerateArgs) -> Result<()> {
    let request = args.to_request();
    for id in state.unknown_sensors(&request) {
        warn!(sensor = %id, "Unknown sensor id, skipping");
    }

    let mut generator = state.generator();
    if args.no_upgrade_send {
        let mut options = generator.options();
        options.upgrade_send_calls = false;
        generator = generator.with_options(options);
    }
    let program = generator.generate(&state.prepare(request));

    match &args.output {
        Some(path) => {
            let target = output_path(path, &program);
            std::fs::write(&target, &program.source)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!(path = %target.display(), bytes = program.source.len(), "Firmware written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(program.source.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Directories get the derived file name appended
fn output_path(path: &Path, program: &GeneratedProgram) -> PathBuf {
    if path.is_dir() {
        path.join(&program.file_name)
    } else {
        path.to_path_buf()
    }
}

/// List catalog sensors
pub fn sensors(state: &AppState, args: &SensorsArgs) -> Result<()> {
    let query = SensorQuery {
        category: args.category,
        text: args.search.clone(),
    };
    let found = state.registry.search(&query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    for sensor in found {
        println!("{:<12} {:<14} {}", sensor.id, sensor.category, sensor.label);
    }
    Ok(())
}

/// Print the wiring guide
pub fn wiring(state: &AppState, args: &WiringArgs) -> Result<()> {
    let mut request = GenerationRequest::default();
    for id in &args.sensors {
        request.enable(id.as_str());
    }
    for id in state.unknown_sensors(&request) {
        warn!(sensor = %id, "Unknown sensor id, skipping");
    }
    print!("{}", state.wiring(&request));
    Ok(())
}

/// Print a fresh device id
pub fn new_id() -> Result<()> {
    println!("{}", DeviceId::generate());
    Ok(())
}
