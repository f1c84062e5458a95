//! Sensor capability types
//!
//! A capability describes one supported sensor board: how it is wired to the
//! ESP32 and which code fragments the generator splices into the firmware.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::registry::RegistryError;

/// Broad grouping of sensors used for catalog filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    Environmental,
    Gas,
    Motion,
    Power,
    Liquid,
    Other,
}

impl SensorCategory {
    /// All categories in display order
    pub const ALL: [SensorCategory; 6] = [
        Self::Environmental,
        Self::Gas,
        Self::Motion,
        Self::Power,
        Self::Liquid,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environmental => "environmental",
            Self::Gas => "gas",
            Self::Motion => "motion",
            Self::Power => "power",
            Self::Liquid => "liquid",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SensorCategory {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| RegistryError::UnknownCategory(name.to_string()))
    }
}

/// One row of a wiring table: sensor pin to ESP32 pin or supply rail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinAssignment {
    /// Pin label on the sensor board (e.g., "VCC", "DATA", "Trig")
    pub pin: String,
    /// ESP32 pin or voltage label (e.g., "D4", "3.3V", "D15 (Pullup 4.7k)")
    pub esp: String,
}

impl PinAssignment {
    pub fn new(pin: impl Into<String>, esp: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            esp: esp.into(),
        }
    }
}

/// Source fragments contributed by a sensor to the generated firmware
///
/// Empty strings are treated the same as missing fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFragments {
    /// `#include` lines
    #[serde(default)]
    pub include: Option<String>,
    /// `#define` lines and global object declarations
    #[serde(default)]
    pub define: Option<String>,
    /// Statements for `setup()`, real sensor mode only
    #[serde(default)]
    pub setup: Option<String>,
    /// Statements reading the hardware into the sensor variables
    #[serde(default)]
    pub read: Option<String>,
    /// Statements producing random plausible values, simulation mode only
    #[serde(default, alias = "mock")]
    pub simulated_read: Option<String>,
    /// Statements pushing the variables to the realtime database
    #[serde(default)]
    pub send: Option<String>,
    /// Global variable declarations backing the readings
    #[serde(default)]
    pub vars: Option<String>,
}

impl CodeFragments {
    /// Returns the fragment if it has any content
    pub fn get(fragment: &Option<String>) -> Option<&str> {
        fragment.as_deref().filter(|s| !s.is_empty())
    }

    pub fn include(&self) -> Option<&str> {
        Self::get(&self.include)
    }

    pub fn define(&self) -> Option<&str> {
        Self::get(&self.define)
    }

    pub fn setup(&self) -> Option<&str> {
        Self::get(&self.setup)
    }

    pub fn read(&self) -> Option<&str> {
        Self::get(&self.read)
    }

    pub fn simulated_read(&self) -> Option<&str> {
        Self::get(&self.simulated_read)
    }

    pub fn send(&self) -> Option<&str> {
        Self::get(&self.send)
    }

    pub fn vars(&self) -> Option<&str> {
        Self::get(&self.vars)
    }
}

/// A supported sensor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCapability {
    /// Stable catalog key (e.g., "dht11", "mq2")
    pub id: String,
    /// Human-readable name
    pub label: String,
    pub category: SensorCategory,
    /// Wiring table, in display order
    #[serde(default)]
    pub pins: Vec<PinAssignment>,
    #[serde(default)]
    pub code: CodeFragments,
}

impl SensorCapability {
    /// Case-insensitive substring match against label and id
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.label.to_lowercase().contains(&needle) || self.id.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in SensorCategory::ALL {
            let parsed: SensorCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!("GAS".parse::<SensorCategory>().unwrap(), SensorCategory::Gas);
        assert!("plasma".parse::<SensorCategory>().is_err());
    }

    #[test]
    fn test_empty_fragment_is_absent() {
        let code = CodeFragments {
            include: Some(String::new()),
            read: Some("int x = 1;".to_string()),
            ..Default::default()
        };
        assert_eq!(code.include(), None);
        assert_eq!(code.read(), Some("int x = 1;"));
        assert_eq!(code.setup(), None);
    }

    #[test]
    fn test_mock_alias() {
        let code: CodeFragments = toml::from_str(r#"mock = "int x = random(0, 2);""#).unwrap();
        assert_eq!(code.simulated_read(), Some("int x = random(0, 2);"));
    }
}
