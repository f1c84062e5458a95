//! Sensor Capability Registry - Read-only catalog of supported sensors
//!
//! The builtin catalog is built once on first access and never mutated.
//! Deployments can layer an extension file on top of it; the result is a
//! new registry, the builtin one stays untouched.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::catalog;
use crate::sensor::{SensorCapability, SensorCategory};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read sensor registry: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse sensor registry: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Duplicate sensor id in registry file: {0}")]
    DuplicateId(String),
    #[error("Sensor entry with empty id (label: {0})")]
    EmptyId(String),
    #[error("Unknown sensor category: {0}")]
    UnknownCategory(String),
}

static BUILTIN: Lazy<SensorRegistry> =
    Lazy::new(|| SensorRegistry::new(catalog::builtin_sensors()));

/// Catalog filter used by UI enumeration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorQuery {
    /// Only sensors in this category
    #[serde(default)]
    pub category: Option<SensorCategory>,
    /// Case-insensitive substring of label or id
    #[serde(default, alias = "q")]
    pub text: Option<String>,
}

impl SensorQuery {
    fn matches(&self, sensor: &SensorCapability) -> bool {
        if let Some(category) = self.category {
            if sensor.category != category {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => sensor.matches_text(text),
            _ => true,
        }
    }
}

/// Immutable, id-addressable sensor catalog
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    sensors: Vec<SensorCapability>,
    index: HashMap<String, usize>,
}

impl SensorRegistry {
    /// Build a registry from a list of sensors
    ///
    /// A later entry with an id already present replaces the earlier entry
    /// in its original position.
    pub fn new(entries: Vec<SensorCapability>) -> Self {
        let mut sensors: Vec<SensorCapability> = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for sensor in entries {
            match index.get(&sensor.id) {
                Some(&pos) => sensors[pos] = sensor,
                None => {
                    index.insert(sensor.id.clone(), sensors.len());
                    sensors.push(sensor);
                }
            }
        }

        Self { sensors, index }
    }

    /// The builtin catalog
    pub fn builtin() -> &'static SensorRegistry {
        &BUILTIN
    }

    /// New registry with `extra` layered over this one
    pub fn extended(&self, extra: Vec<SensorCapability>) -> Self {
        let mut entries = self.sensors.clone();
        entries.extend(extra);
        Self::new(entries)
    }

    /// Look up a sensor by id; unknown ids are simply absent
    pub fn lookup(&self, id: &str) -> Option<&SensorCapability> {
        self.index.get(id).map(|&pos| &self.sensors[pos])
    }

    /// All sensors in catalog order
    pub fn list_all(&self) -> &[SensorCapability] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Sensors matching every filter set in the query
    pub fn search(&self, query: &SensorQuery) -> Vec<&SensorCapability> {
        self.sensors.iter().filter(|s| query.matches(s)).collect()
    }

    /// Resolve ids in caller order, dropping the ones not in the catalog
    pub fn resolve<'a, I, S>(&self, ids: I) -> Vec<&SensorCapability>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        ids.into_iter()
            .filter_map(|id| {
                let id = id.as_ref();
                let found = self.lookup(id);
                if found.is_none() {
                    debug!(sensor = %id, "Ignoring unknown sensor id");
                }
                found
            })
            .collect()
    }

    /// Number of sensors per category, in category order
    pub fn categories(&self) -> Vec<(SensorCategory, usize)> {
        SensorCategory::ALL
            .into_iter()
            .map(|c| (c, self.sensors.iter().filter(|s| s.category == c).count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Extension catalog file containing `[[sensor]]` tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub sensor: Vec<SensorCapability>,
}

impl RegistryFile {
    /// Load and validate an extension catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate an extension catalog from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for sensor in &self.sensor {
            if sensor.id.trim().is_empty() {
                return Err(RegistryError::EmptyId(sensor.label.clone()));
            }
            if !seen.insert(sensor.id.as_str()) {
                return Err(RegistryError::DuplicateId(sensor.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXTENSION: &str = r##"
[[sensor]]
id = "ldr"
label = "LDR Light Sensor"
category = "environmental"
pins = [
    { pin = "VCC", esp = "3.3V" },
    { pin = "AO", esp = "D25" },
]

[sensor.code]
define = "#define LDR_PIN 25"
setup = "pinMode(LDR_PIN, INPUT);"
read = "int light = analogRead(LDR_PIN);"
mock = "int light = random(0, 4095);"
send = "Firebase.setInt(fbdo, sensorsPath(\"light\").c_str(), light);"
vars = "int light = 0;"

[[sensor]]
id = "mq2"
label = "MQ-2 (rev B)"
category = "gas"
"##;

    #[test]
    fn test_builtin_lookup() {
        let registry = SensorRegistry::builtin();
        assert_eq!(registry.len(), 18);
        assert_eq!(registry.lookup("dht11").unwrap().label, "DHT11 Temp & Humidity");
        assert!(registry.lookup("nonexistent").is_none());
        assert_eq!(registry.list_all()[0].id, "dht11");
    }

    #[test]
    fn test_search_by_category() {
        let registry = SensorRegistry::builtin();
        let query = SensorQuery {
            category: Some(SensorCategory::Gas),
            text: None,
        };
        let ids: Vec<_> = registry.search(&query).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["mq2", "mq135"]);
    }

    #[test]
    fn test_search_text_case_insensitive() {
        let registry = SensorRegistry::builtin();
        let query = SensorQuery {
            category: None,
            text: Some("dht".to_string()),
        };
        assert_eq!(registry.search(&query).len(), 2);

        let query = SensorQuery {
            category: Some(SensorCategory::Environmental),
            text: Some("TEMP".to_string()),
        };
        let ids: Vec<_> = registry.search(&query).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["dht11", "ds18b20", "bme280"]);
    }

    #[test]
    fn test_empty_query_returns_all() {
        let registry = SensorRegistry::builtin();
        assert_eq!(registry.search(&SensorQuery::default()).len(), registry.len());
    }

    #[test]
    fn test_resolve_preserves_order_and_drops_unknown() {
        let registry = SensorRegistry::builtin();
        let resolved = registry.resolve(["mq2", "bogus", "dht11"].iter().copied());
        let ids: Vec<_> = resolved.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["mq2", "dht11"]);
    }

    #[test]
    fn test_categories() {
        let categories = SensorRegistry::builtin().categories();
        assert_eq!(categories[0], (SensorCategory::Environmental, 6));
        assert!(categories.contains(&(SensorCategory::Other, 1)));
        let total: usize = categories.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 18);
    }

    #[test]
    fn test_extension_overrides_builtin() {
        let file = RegistryFile::from_toml(EXTENSION).unwrap();
        let registry = SensorRegistry::builtin().extended(file.sensor);

        assert_eq!(registry.len(), 19);
        assert_eq!(registry.lookup("mq2").unwrap().label, "MQ-2 (rev B)");
        // Overridden entry keeps its catalog position
        assert_eq!(registry.list_all()[5].id, "mq2");
        let ldr = registry.lookup("ldr").unwrap();
        assert_eq!(ldr.code.simulated_read(), Some("int light = random(0, 4095);"));
        assert_eq!(ldr.pins.len(), 2);
        assert_eq!(ldr.code.define(), Some("#define LDR_PIN 25"));
        assert_eq!(ldr.code.vars(), Some("int light = 0;"));

        // Builtin is not affected
        assert_eq!(SensorRegistry::builtin().lookup("mq2").unwrap().label, "MQ-2 Smoke/LPG/CO");
    }

    #[test]
    fn test_extension_rejects_duplicates() {
        let toml = r#"
[[sensor]]
id = "a"
label = "A"
category = "other"

[[sensor]]
id = "a"
label = "A again"
category = "other"
"#;
        let err = RegistryFile::from_toml(toml).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_extension_rejects_empty_id() {
        let toml = r#"
[[sensor]]
id = " "
label = "Nameless"
category = "other"
"#;
        assert!(matches!(
            RegistryFile::from_toml(toml),
            Err(RegistryError::EmptyId(_))
        ));
    }

    #[test]
    fn test_extension_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXTENSION.as_bytes()).unwrap();

        let loaded = RegistryFile::from_file(file.path()).unwrap();
        assert_eq!(loaded.sensor.len(), 2);
        assert!(RegistryFile::from_file(Path::new("/nonexistent/sensors.toml")).is_err());
    }
}
