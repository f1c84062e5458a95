//! Application state shared by the CLI commands and the HTTP API

use anyhow::{Context, Result};
use sensorgen_core::{
    FirmwareGenerator, GeneratedProgram, GenerationRequest, RegistryFile, SensorRegistry,
    WiringGuide,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Shared application state
///
/// Everything here is read-only after construction, so handlers share it
/// without locking.
pub struct AppState {
    /// Builtin catalog plus the configured extension, if any
    pub registry: SensorRegistry,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let registry = load_registry(config.registry.path.as_deref())?;
        Ok(Arc::new(Self { registry, config }))
    }

    pub fn generator(&self) -> FirmwareGenerator<'_> {
        FirmwareGenerator::new(&self.registry).with_options(self.config.generator.options())
    }

    /// Apply configured defaults to a caller request
    pub fn prepare(&self, mut request: GenerationRequest) -> GenerationRequest {
        request.credentials = request.credentials.merged_over(&self.config.credentials);
        if request.simulation.is_none() {
            request.simulation = Some(self.config.generator.simulation);
        }
        request
    }

    pub fn generate(&self, request: GenerationRequest) -> GeneratedProgram {
        self.generator().generate(&self.prepare(request))
    }

    pub fn wiring(&self, request: &GenerationRequest) -> WiringGuide {
        WiringGuide::for_request(&self.registry, request)
    }

    /// Ids in `request` that the registry does not know
    pub fn unknown_sensors<'a>(&self, request: &'a GenerationRequest) -> Vec<&'a str> {
        request
            .sensors
            .iter()
            .map(String::as_str)
            .filter(|id| self.registry.lookup(id).is_none())
            .collect()
    }
}

fn load_registry(extension: Option<&str>) -> Result<SensorRegistry> {
    let builtin = SensorRegistry::builtin();
    let Some(path) = extension else {
        return Ok(builtin.clone());
    };

    let file = RegistryFile::from_file(Path::new(path))
        .with_context(|| format!("Failed to load sensor registry extension {}", path))?;
    let added = file.sensor.len();
    let registry = builtin.extended(file.sensor);
    info!(
        path = %path,
        added,
        total = registry.len(),
        "Loaded sensor registry extension"
    );
    Ok(registry)
}
