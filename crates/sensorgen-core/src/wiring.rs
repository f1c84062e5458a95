//! Wiring guide for the sensors enabled in a request

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::SensorRegistry;
use crate::request::GenerationRequest;
use crate::sensor::{PinAssignment, SensorCategory};

const SAFETY_NOTE: &str = "Safety first: double-check all connections before powering on. \
Ensure common ground between ESP32 and external power supplies.";

/// Wiring instructions for one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringEntry {
    /// 1-based position in the guide
    pub index: usize,
    pub id: String,
    pub label: String,
    pub category: SensorCategory,
    pub pins: Vec<PinAssignment>,
}

/// Ordered wiring instructions, one entry per resolved sensor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringGuide {
    pub entries: Vec<WiringEntry>,
}

impl WiringGuide {
    /// Build the guide in request order; unknown ids are skipped
    pub fn for_request(registry: &SensorRegistry, request: &GenerationRequest) -> Self {
        let entries = registry
            .resolve(&request.sensors)
            .into_iter()
            .enumerate()
            .map(|(i, sensor)| WiringEntry {
                index: i + 1,
                id: sensor.id.clone(),
                label: sensor.label.clone(),
                category: sensor.category,
                pins: sensor.pins.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for WiringGuide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No sensors selected.");
        }

        writeln!(f, "{}", SAFETY_NOTE)?;
        for entry in &self.entries {
            writeln!(f)?;
            writeln!(f, "{}. {} [{}]", entry.index, entry.label, entry.category)?;
            for pin in &entry.pins {
                writeln!(f, "   {} -> {}", pin.pin, pin.esp)?;
            }
        }
        Ok(())
    }
}
