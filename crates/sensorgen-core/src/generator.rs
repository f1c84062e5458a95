//! Firmware Source Generator - Assembles an ESP32 sketch from sensor fragments
//!
//! Generation is a pure function of the request and the registry:
//! 1. Resolve enabled sensor ids, dropping unknown ones
//! 2. Emit the credential and device id defines
//! 3. Merge every sensor's fragments into the section buffers
//! 4. Substitute the sections into the fixed skeleton
//!
//! Unknown ids and missing fragments are skipped, so generation never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::registry::SensorRegistry;
use crate::request::GenerationRequest;
use crate::sensor::SensorCapability;
use crate::template::{self, FirmwareSections, BASE_INCLUDES};

/// Matches a typed assignment such as `float temperature =`
static TYPED_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(float|int|long|bool|char\*)\s+(\w+)\s*=").expect("typed assignment pattern")
});

/// Download name used when the device id is empty
pub const DEFAULT_FILE_NAME: &str = "esp32_direct.ino";

/// Generator tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Rewrite legacy `Firebase.set*(fbdo, ...)` calls in send fragments to
    /// `Firebase.RTDB.set*(&fbdo, ...)`
    #[serde(default = "default_true")]
    pub upgrade_send_calls: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            upgrade_send_calls: true,
        }
    }
}

/// A generated sketch ready for preview, copy or download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProgram {
    /// Suggested download file name
    pub file_name: String,
    /// Complete sketch source
    pub source: String,
}

impl GeneratedProgram {
    /// Download file name derived from a device id
    ///
    /// Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn file_name_for(device_id: &str) -> String {
        let id = device_id.trim();
        if id.is_empty() {
            return DEFAULT_FILE_NAME.to_string();
        }
        let sanitized: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("esp32_{}.ino", sanitized)
    }
}

impl fmt::Display for GeneratedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Firmware generator bound to a sensor registry
#[derive(Debug, Clone, Copy)]
pub struct FirmwareGenerator<'r> {
    registry: &'r SensorRegistry,
    options: GeneratorOptions,
}

impl<'r> FirmwareGenerator<'r> {
    pub fn new(registry: &'r SensorRegistry) -> Self {
        Self {
            registry,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> GeneratorOptions {
        self.options
    }

    /// Generate the complete sketch for a request
    pub fn generate(&self, request: &GenerationRequest) -> GeneratedProgram {
        let sensors = self.registry.resolve(&request.sensors);
        let sections = self.collect_sections(request, &sensors);
        let source = template::render(&sections, request.is_simulated());

        debug!(
            device = %request.device_id,
            requested = request.sensors.len(),
            resolved = sensors.len(),
            simulation = request.is_simulated(),
            bytes = source.len(),
            "Generated firmware"
        );

        GeneratedProgram {
            file_name: GeneratedProgram::file_name_for(&request.device_id),
            source,
        }
    }

    /// Section buffers for a request, before skeleton substitution
    pub fn sections(&self, request: &GenerationRequest) -> FirmwareSections {
        let sensors = self.registry.resolve(&request.sensors);
        self.collect_sections(request, &sensors)
    }

    fn collect_sections(
        &self,
        request: &GenerationRequest,
        sensors: &[&SensorCapability],
    ) -> FirmwareSections {
        let creds = &request.credentials;
        let mut sections = FirmwareSections {
            includes: BASE_INCLUDES.iter().map(|s| s.to_string()).collect(),
            defines: vec![
                quoted_define("WIFI_SSID", creds.wifi_ssid_or_placeholder()),
                quoted_define("WIFI_PASSWORD", creds.wifi_password_or_placeholder()),
                quoted_define("API_KEY", creds.api_key_or_placeholder()),
                quoted_define("DATABASE_URL", creds.database_url_or_placeholder()),
                quoted_define("DEVICE_ID", &request.device_id),
            ],
            ..Default::default()
        };

        for sensor in sensors {
            let code = &sensor.code;

            if let Some(include) = code.include() {
                for line in trimmed_lines(include) {
                    push_unique(&mut sections.includes, line);
                }
            }

            if let Some(define) = code.define() {
                sections
                    .defines
                    .extend(trimmed_lines(define).map(str::to_string));
            }

            if !request.is_simulated() {
                if let Some(setup) = code.setup() {
                    sections.setup.push(format!("  // {}\n  {}", sensor.label, setup));
                }
            }

            let read = if request.is_simulated() {
                code.simulated_read().map(|r| {
                    format!(
                        "    // {} (SIMULATION)\n    {}",
                        sensor.label,
                        strip_type_annotations(r)
                    )
                })
            } else {
                code.read().map(|r| {
                    format!("    // {}\n    {}", sensor.label, strip_type_annotations(r))
                })
            };
            sections.read.extend(read);

            if let Some(vars) = code.vars() {
                for line in trimmed_lines(vars) {
                    push_unique(&mut sections.vars, line);
                }
            }

            if let Some(send) = code.send() {
                let send = if self.options.upgrade_send_calls {
                    upgrade_send_calls(send)
                } else {
                    send.to_string()
                };
                sections.send.push(format!("      // {}\n      {}", sensor.label, send));
            }
        }

        sections
    }
}

fn quoted_define(name: &str, value: &str) -> String {
    format!("#define {} \"{}\"", name, value)
}

fn trimmed_lines(fragment: &str) -> impl Iterator<Item = &str> {
    fragment.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Append unless an identical line is already present
fn push_unique(lines: &mut Vec<String>, line: &str) {
    if !lines.iter().any(|l| l == line) {
        lines.push(line.to_string());
    }
}

/// `float temperature = x;` becomes `temperature = x;`
///
/// Sensor variables are declared globally, so local redeclarations in read
/// fragments would shadow them.
pub fn strip_type_annotations(fragment: &str) -> String {
    TYPED_ASSIGNMENT.replace_all(fragment, "$2 =").into_owned()
}

/// Rewrite legacy realtime database calls to the namespaced client API
pub fn upgrade_send_calls(fragment: &str) -> String {
    fragment
        .replace("Firebase.set", "Firebase.RTDB.set")
        .replace("(fbdo", "(&fbdo")
}
