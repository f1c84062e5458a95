//! ESP32 firmware skeleton
//!
//! The skeleton text must stay byte-for-byte stable: previously generated
//! sketches are compared against fresh output.

/// Name written into the header comment of every generated sketch
pub const SKETCH_NAME: &str = "esp32_firmware_direct.ino";

/// Base includes, always emitted before sensor includes
pub const BASE_INCLUDES: [&str; 5] = [
    "#include <WiFi.h>",
    "#include <Firebase_ESP_Client.h>",
    "#include \"addons/TokenHelper.h\"",
    "#include \"addons/RTDBHelper.h\"",
    "#include <time.h>",
];

const SKELETON: &str = r#"// File: {{sketch}}
{{includes}}

// ----------------------
// USER CONFIG
// ----------------------
{{defines}}
#define RELAY_PIN 5 

// Firebase Objects
FirebaseData fbdo;
FirebaseAuth auth;
FirebaseConfig config;
bool signupOK = false;

const char* ntp1 = "pool.ntp.org";
const char* ntp2 = "time.nist.gov";
const long gmtOffset = 0;
const int daylightOffset = 0;

unsigned long lastSend = 0;
const unsigned long SEND_INTERVAL = 2000; // 2 sec

// Global Sensor Variables
{{vars}}

// Helper to build path: /devices/{ID}/sensors/{SENSOR}
String sensorsPath(String sensorName) {
  return String("/devices/") + DEVICE_ID + "/sensors/" + sensorName;
}

void connectWiFi() {
  Serial.print("Connecting to: "); Serial.println(WIFI_SSID);
  WiFi.mode(WIFI_STA);
  WiFi.begin(WIFI_SSID, WIFI_PASSWORD);
  while (WiFi.status() != WL_CONNECTED) { delay(300); Serial.print("."); }
  Serial.println("\nConnected! IP: "); Serial.println(WiFi.localIP());
}

void syncTime() {
  configTime(gmtOffset, daylightOffset, ntp1, ntp2);
  time_t now = time(nullptr);
  while (now < 1600000000) { delay(200); now = time(nullptr); }
}

void setup() {
  Serial.begin(115200);
  delay(100);
  Serial.println("\n=== ESP32 Firmware (Direct Mode) ===");
  {{simulation_warning}}

  pinMode(RELAY_PIN, OUTPUT);
  digitalWrite(RELAY_PIN, LOW); // ON initially

  connectWiFi();
  syncTime();
  randomSeed(analogRead(0));

  // ---------------------------
  // Firebase Setup
  // ---------------------------
  config.api_key = API_KEY;
  config.database_url = DATABASE_URL;

  // Show token generation info on Serial Monitor
  config.token_status_callback = tokenStatusCallback;
  config.max_token_generation_retry = 5;

  // Anonymous sign-up (no email, no password)
  if (Firebase.signUp(&config, &auth, "", "")) {
    Serial.println("Firebase signup OK");
    signupOK = true;
  } else {
    Serial.printf("Firebase signup FAILED: %s\n", config.signer.signupError.message.c_str());
  }

  Firebase.begin(&config, &auth);
  Firebase.reconnectWiFi(true);

  // Sensor Setup
{{setup}}
}

void loop() {
  if (WiFi.status() != WL_CONNECTED) connectWiFi();

  unsigned long now = millis();

  if (now - lastSend >= SEND_INTERVAL) {
    lastSend = now;
    
    // ---------------------------
    // 1. Read Sensors {{read_mode}}
    // ---------------------------
{{read}}

    // ---------------------------
    // 2. Send to Firebase (Direct)
    // ---------------------------
    if (Firebase.ready() && signupOK) {
      Serial.println("Sending data to Firebase...");
      
      String lastSeenPath = "/devices/" + String(DEVICE_ID) + "/meta/lastSeen";
      String onlinePath   = "/devices/" + String(DEVICE_ID) + "/meta/online";

      // Meta
      if (!Firebase.RTDB.setInt(&fbdo, lastSeenPath.c_str(), time(nullptr))) {
        Serial.print("lastSeen error: "); Serial.println(fbdo.errorReason());
      }
      if (!Firebase.RTDB.setBool(&fbdo, onlinePath.c_str(), true)) {
        Serial.print("online error: "); Serial.println(fbdo.errorReason());
      }

{{send}}
      
    } else {
      Serial.println("Firebase not ready (token not generated yet or signup failed)");
    }
  }
}
"#;

/// Assembled section buffers, one entry per line or per sensor block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareSections {
    pub includes: Vec<String>,
    pub defines: Vec<String>,
    pub setup: Vec<String>,
    pub read: Vec<String>,
    pub vars: Vec<String>,
    pub send: Vec<String>,
}

/// Substitute the sections into the skeleton
pub fn render(sections: &FirmwareSections, simulation: bool) -> String {
    let includes = sections.includes.join("\n");
    let defines = sections.defines.join("\n");
    let vars = sections.vars.join("\n");
    let setup = sections.setup.join("\n");
    let read = sections.read.join("\n");
    let send = sections.send.join("\n");

    let (warning, read_mode) = if simulation {
        ("Serial.println(\"WARNING: RUNNING IN SIMULATION MODE\");", "(SIMULATED)")
    } else {
        ("", "")
    };

    fill(SKELETON, |key| match key {
        "sketch" => Some(SKETCH_NAME),
        "includes" => Some(includes.as_str()),
        "defines" => Some(defines.as_str()),
        "vars" => Some(vars.as_str()),
        "simulation_warning" => Some(warning),
        "setup" => Some(setup.as_str()),
        "read_mode" => Some(read_mode),
        "read" => Some(read.as_str()),
        "send" => Some(send.as_str()),
        _ => None,
    })
}

/// Single pass over `skeleton` replacing `{{key}}` markers
///
/// Substituted text is never rescanned, so fragments may contain anything.
/// Unknown keys are left in place.
fn fill<'a, F>(skeleton: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(skeleton.len() * 2);
    let mut rest = skeleton;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill("a {{x}} b {{y}}", |k| match k {
            "x" => Some("{{y}}"),
            "y" => Some("Y"),
            _ => None,
        });
        assert_eq!(out, "a {{y}} b Y");
    }

    #[test]
    fn test_fill_keeps_unknown_and_unterminated() {
        assert_eq!(fill("{{nope}} {{open", |_| None), "{{nope}} {{open");
    }

    #[test]
    fn test_render_empty_sections_has_no_markers() {
        let out = render(&FirmwareSections::default(), false);
        assert!(!out.contains("{{"));
        assert!(out.starts_with("// File: esp32_firmware_direct.ino\n"));
        assert!(out.contains("#define RELAY_PIN 5 \n"));
        assert!(out.contains("    // 1. Read Sensors \n"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_render_simulation_banner() {
        let out = render(&FirmwareSections::default(), true);
        assert!(out.contains("  Serial.println(\"WARNING: RUNNING IN SIMULATION MODE\");\n"));
        assert!(out.contains("    // 1. Read Sensors (SIMULATED)\n"));
    }
}
