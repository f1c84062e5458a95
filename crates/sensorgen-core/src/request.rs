//! Generation request types

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const WIFI_SSID_PLACEHOLDER: &str = "YOUR_WIFI_SSID";
pub const WIFI_PASSWORD_PLACEHOLDER: &str = "YOUR_WIFI_PASSWORD";
pub const API_KEY_PLACEHOLDER: &str = "YOUR_FIREBASE_API_KEY";
pub const DATABASE_URL_PLACEHOLDER: &str = "YOUR_FIREBASE_DATABASE_URL";

/// WiFi and realtime database credentials embedded into the firmware
///
/// Blank values count as missing and are replaced by placeholder tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCredentials {
    #[serde(default)]
    pub wifi_ssid: Option<String>,
    #[serde(default)]
    pub wifi_password: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl NetworkCredentials {
    pub fn wifi_ssid_or_placeholder(&self) -> &str {
        present(&self.wifi_ssid).unwrap_or(WIFI_SSID_PLACEHOLDER)
    }

    pub fn wifi_password_or_placeholder(&self) -> &str {
        present(&self.wifi_password).unwrap_or(WIFI_PASSWORD_PLACEHOLDER)
    }

    pub fn api_key_or_placeholder(&self) -> &str {
        present(&self.api_key).unwrap_or(API_KEY_PLACEHOLDER)
    }

    pub fn database_url_or_placeholder(&self) -> &str {
        present(&self.database_url).unwrap_or(DATABASE_URL_PLACEHOLDER)
    }

    /// Fill missing fields from `defaults`
    pub fn merged_over(&self, defaults: &NetworkCredentials) -> NetworkCredentials {
        let pick = |own: &Option<String>, fallback: &Option<String>| {
            present(own).or_else(|| present(fallback)).map(str::to_string)
        };
        NetworkCredentials {
            wifi_ssid: pick(&self.wifi_ssid, &defaults.wifi_ssid),
            wifi_password: pick(&self.wifi_password, &defaults.wifi_password),
            api_key: pick(&self.api_key, &defaults.api_key),
            database_url: pick(&self.database_url, &defaults.database_url),
        }
    }
}

/// Everything the generator needs for one firmware build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Device id, embedded verbatim as `DEVICE_ID`
    pub device_id: String,
    /// Enabled sensor ids in the order they were enabled, no duplicates
    #[serde(default, deserialize_with = "dedup_ids")]
    pub sensors: Vec<String>,
    #[serde(default)]
    pub credentials: NetworkCredentials,
    /// Generate random readings instead of touching hardware; `None` leaves
    /// the choice to the caller's configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<bool>,
}

/// Accepts either an id list or an `{id: enabled}` toggle map, keeping
/// document order and dropping repeats
fn dedup_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(SensorIdsVisitor)
}

struct SensorIdsVisitor;

impl<'de> Visitor<'de> for SensorIdsVisitor {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of sensor ids or a map of sensor id to bool")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut ids: Vec<String> = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(id) = seq.next_element::<String>()? {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut ids: Vec<String> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((id, enabled)) = map.next_entry::<String, bool>()? {
            if !enabled {
                ids.retain(|s| *s != id);
            } else if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl GenerationRequest {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Build a request from an ordered sensor toggle map
    pub fn from_toggles<I, S>(device_id: impl Into<String>, toggles: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let mut request = Self::new(device_id);
        for (id, enabled) in toggles {
            if enabled {
                request.enable(id);
            }
        }
        request
    }

    /// Enable a sensor; re-enabling keeps its original position
    pub fn enable(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if !self.sensors.contains(&id) {
            self.sensors.push(id);
        }
        self
    }

    pub fn disable(&mut self, id: &str) -> &mut Self {
        self.sensors.retain(|s| s != id);
        self
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.sensors.iter().any(|s| s == id)
    }

    pub fn with_sensor(mut self, id: impl Into<String>) -> Self {
        self.enable(id);
        self
    }

    pub fn with_credentials(mut self, credentials: NetworkCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Whether simulated readings are generated, off unless requested
    pub fn is_simulated(&self) -> bool {
        self.simulation.unwrap_or(false)
    }
}
