//! Builtin sensor catalog
//!
//! Fragments are spliced verbatim into the generated sketch. Continuation
//! lines carry two spaces of indentation so they line up with the first
//! line once the generator indents the block.
//!
//! Every `read`, `mock` and `send` fragment must only use the variable names
//! declared in the same entry's `vars`.

use crate::sensor::{CodeFragments, PinAssignment, SensorCapability, SensorCategory};

struct Entry {
    id: &'static str,
    label: &'static str,
    category: SensorCategory,
    pins: &'static [(&'static str, &'static str)],
    include: &'static str,
    define: &'static str,
    setup: &'static str,
    read: &'static str,
    mock: &'static str,
    send: &'static str,
    vars: &'static str,
}

impl Entry {
    fn to_capability(&self) -> SensorCapability {
        let fragment = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SensorCapability {
            id: self.id.to_string(),
            label: self.label.to_string(),
            category: self.category,
            pins: self
                .pins
                .iter()
                .map(|(pin, esp)| PinAssignment::new(*pin, *esp))
                .collect(),
            code: CodeFragments {
                include: fragment(self.include),
                define: fragment(self.define),
                setup: fragment(self.setup),
                read: fragment(self.read),
                simulated_read: fragment(self.mock),
                send: fragment(self.send),
                vars: fragment(self.vars),
            },
        }
    }
}

use SensorCategory::*;

const ENTRIES: &[Entry] = &[
    // Environmental
    Entry {
        id: "dht11",
        label: "DHT11 Temp & Humidity",
        category: Environmental,
        pins: &[("VCC", "3.3V"), ("GND", "GND"), ("DATA", "D4")],
        include: "#include <DHT.h>",
        define: "#define DHTPIN 4\n#define DHTTYPE DHT11\nDHT dht(DHTPIN, DHTTYPE);",
        setup: "dht.begin();",
        read: "float temperature = dht.readTemperature();\n  float humidity = dht.readHumidity();",
        mock: "float temperature = random(20, 35) + random(0, 100) / 100.0;\n  float humidity = random(40, 80) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"temperature\").c_str(), temperature);\n  Firebase.setFloat(fbdo, sensorsPath(\"humidity\").c_str(), humidity);",
        vars: "float temperature = 0.0;\nfloat humidity = 0.0;",
    },
    Entry {
        id: "dht22",
        label: "DHT22 High Precision",
        category: Environmental,
        pins: &[("VCC", "3.3V"), ("GND", "GND"), ("DATA", "D4")],
        include: "#include <DHT.h>",
        define: "#define DHTPIN 4\n#define DHTTYPE DHT22\nDHT dht(DHTPIN, DHTTYPE);",
        setup: "dht.begin();",
        read: "float temperature = dht.readTemperature();\n  float humidity = dht.readHumidity();",
        mock: "float temperature = random(20, 35) + random(0, 100) / 100.0;\n  float humidity = random(40, 80) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"temperature\").c_str(), temperature);\n  Firebase.setFloat(fbdo, sensorsPath(\"humidity\").c_str(), humidity);",
        vars: "float temperature = 0.0;\nfloat humidity = 0.0;",
    },
    Entry {
        id: "ds18b20",
        label: "DS18B20 Waterproof Temp",
        category: Environmental,
        pins: &[("VCC", "3.3V/5V"), ("GND", "GND"), ("DATA", "D15 (Pullup 4.7k)")],
        include: "#include <OneWire.h>\n#include <DallasTemperature.h>",
        define: "#define ONE_WIRE_BUS 15\nOneWire oneWire(ONE_WIRE_BUS);\nDallasTemperature sensors(&oneWire);",
        setup: "sensors.begin();",
        read: "sensors.requestTemperatures();\n  float temperature = sensors.getTempCByIndex(0);",
        mock: "float temperature = random(20, 80) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"temperature\").c_str(), temperature);",
        vars: "float temperature = 0.0;",
    },
    Entry {
        id: "bme280",
        label: "BME280 Temp/Hum/Pressure",
        category: Environmental,
        pins: &[("VCC", "3.3V"), ("GND", "GND"), ("SDA", "D21"), ("SCL", "D22")],
        include: "#include <Wire.h>\n#include <Adafruit_Sensor.h>\n#include <Adafruit_BME280.h>",
        define: "Adafruit_BME280 bme; // I2C",
        setup: "if (!bme.begin(0x76)) { Serial.println(\"BME280 Fail\"); }",
        read: "float temperature = bme.readTemperature();\n  float humidity = bme.readHumidity();\n  float pressure = bme.readPressure() / 100.0F;",
        mock: "float temperature = random(15, 30) + random(0, 100) / 100.0;\n  float humidity = random(30, 70) + random(0, 100) / 100.0;\n  float pressure = random(900, 1100) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"temperature\").c_str(), temperature);\n  Firebase.setFloat(fbdo, sensorsPath(\"humidity\").c_str(), humidity);\n  Firebase.setFloat(fbdo, sensorsPath(\"pressure\").c_str(), pressure);",
        vars: "float temperature = 0.0;\nfloat humidity = 0.0;\nfloat pressure = 0.0;",
    },
    Entry {
        id: "soil",
        label: "Soil Moisture Sensor",
        category: Environmental,
        pins: &[("VCC", "3.3V/5V"), ("GND", "GND"), ("AO", "D32")],
        include: "",
        define: "#define SOIL_PIN 32",
        setup: "pinMode(SOIL_PIN, INPUT);",
        read: "int soilRaw = analogRead(SOIL_PIN);\n  float soilMoisture = map(soilRaw, 4095, 0, 0, 100);",
        mock: "float soilMoisture = random(0, 100);",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"soilMoisture\").c_str(), soilMoisture);",
        vars: "int soilRaw = 0;\nfloat soilMoisture = 0.0;",
    },
    // Gas
    Entry {
        id: "mq2",
        label: "MQ-2 Smoke/LPG/CO",
        category: Gas,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("AO", "D34")],
        include: "",
        define: "#define MQ2_PIN 34",
        setup: "pinMode(MQ2_PIN, INPUT);",
        read: "int mq2Raw = analogRead(MQ2_PIN);\n  float gasLevel = mq2Raw / 40.95;",
        mock: "float gasLevel = random(10, 100) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"gasLevel\").c_str(), gasLevel);",
        vars: "int mq2Raw = 0;\nfloat gasLevel = 0.0;",
    },
    Entry {
        id: "mq135",
        label: "MQ-135 Air Quality",
        category: Gas,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("AO", "D35")],
        include: "",
        define: "#define MQ135_PIN 35",
        setup: "pinMode(MQ135_PIN, INPUT);",
        read: "int mq135Raw = analogRead(MQ135_PIN);\n  float airQuality = mq135Raw / 40.95;",
        mock: "float airQuality = random(20, 200) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"airQuality\").c_str(), airQuality);",
        vars: "int mq135Raw = 0;\nfloat airQuality = 0.0;",
    },
    // Motion & distance
    Entry {
        id: "hc_sr04",
        label: "HC-SR04 Ultrasonic",
        category: Motion,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("Trig", "D12"), ("Echo", "D13")],
        include: "",
        define: "#define TRIG_PIN 12\n#define ECHO_PIN 13",
        setup: "pinMode(TRIG_PIN, OUTPUT);\n  pinMode(ECHO_PIN, INPUT);",
        read: "digitalWrite(TRIG_PIN, LOW);\n  delayMicroseconds(2);\n  digitalWrite(TRIG_PIN, HIGH);\n  delayMicroseconds(10);\n  digitalWrite(TRIG_PIN, LOW);\n  long duration = pulseIn(ECHO_PIN, HIGH);\n  float distance = duration * 0.034 / 2;",
        mock: "float distance = random(5, 400) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"distance\").c_str(), distance);",
        vars: "long duration = 0;\nfloat distance = 0.0;",
    },
    Entry {
        id: "mpu6050",
        label: "MPU6050 Accelerometer",
        category: Motion,
        pins: &[("VCC", "3.3V"), ("GND", "GND"), ("SDA", "D21"), ("SCL", "D22")],
        include: "#include <Adafruit_MPU6050.h>\n#include <Adafruit_Sensor.h>\n#include <Wire.h>",
        define: "Adafruit_MPU6050 mpu;",
        setup: "if (!mpu.begin()) { Serial.println(\"MPU6050 Fail\"); }\n  mpu.setAccelerometerRange(MPU6050_RANGE_8_G);\n  mpu.setGyroRange(MPU6050_RANGE_500_DEG);",
        read: "sensors_event_t a, g, temp;\n  mpu.getEvent(&a, &g, &temp);\n  float accX = a.acceleration.x;\n  float accY = a.acceleration.y;\n  float accZ = a.acceleration.z;",
        mock: "float accX = random(-10, 10) / 10.0;\n  float accY = random(-10, 10) / 10.0;\n  float accZ = random(8, 12) / 10.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"accX\").c_str(), accX);\n  Firebase.setFloat(fbdo, sensorsPath(\"accY\").c_str(), accY);\n  Firebase.setFloat(fbdo, sensorsPath(\"accZ\").c_str(), accZ);",
        vars: "float accX = 0.0; float accY = 0.0; float accZ = 0.0;",
    },
    Entry {
        id: "pir",
        label: "PIR Motion Sensor",
        category: Motion,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("OUT", "D27")],
        include: "",
        define: "#define PIR_PIN 27",
        setup: "pinMode(PIR_PIN, INPUT);",
        read: "int motion = digitalRead(PIR_PIN);",
        mock: "int motion = random(0, 2);",
        send: "Firebase.setInt(fbdo, sensorsPath(\"motion\").c_str(), motion);",
        vars: "int motion = 0;",
    },
    Entry {
        id: "sw420",
        label: "SW-420 Vibration",
        category: Motion,
        pins: &[("VCC", "3.3V/5V"), ("GND", "GND"), ("DO", "D26")],
        include: "",
        define: "#define VIB_PIN 26",
        setup: "pinMode(VIB_PIN, INPUT);",
        read: "int vibration = digitalRead(VIB_PIN);",
        mock: "int vibration = random(0, 2);",
        send: "Firebase.setInt(fbdo, sensorsPath(\"vibration\").c_str(), vibration);",
        vars: "int vibration = 0;",
    },
    // Power & electrical
    Entry {
        id: "acs712",
        label: "ACS712 Current (20A)",
        category: Power,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("OUT", "D36 (VP)")],
        include: "",
        define: "#define CURRENT_PIN 36",
        setup: "pinMode(CURRENT_PIN, INPUT);",
        read: "int curRaw = analogRead(CURRENT_PIN);\n  float voltage = (curRaw / 4095.0) * 3.3;\n  float current = (voltage - 1.65) / 0.100; // sensitivity\n  if(current < 0) current = 0;",
        mock: "float current = random(0, 1000) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"current\").c_str(), current);",
        vars: "int curRaw = 0;\nfloat voltage = 0.0;\nfloat current = 0.0;",
    },
    Entry {
        id: "zmpt101b",
        label: "ZMPT101B Voltage",
        category: Power,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("OUT", "D39 (VN)")],
        include: "",
        define: "#define VOLT_PIN 39",
        setup: "pinMode(VOLT_PIN, INPUT);",
        read: "// Simplified RMS calculation\n  float voltage = (analogRead(VOLT_PIN) / 4095.0) * 250.0;",
        mock: "float voltage = random(220, 240) + random(0, 100) / 100.0;",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"voltage\").c_str(), voltage);",
        vars: "float voltage = 0.0;",
    },
    // Liquid & flow
    Entry {
        id: "water_level",
        label: "Water Level Depth",
        category: Liquid,
        pins: &[("VCC", "3.3V/5V"), ("GND", "GND"), ("SIG", "D33")],
        include: "",
        define: "#define WATER_PIN 33",
        setup: "pinMode(WATER_PIN, INPUT);",
        read: "int waterRaw = analogRead(WATER_PIN);\n  float waterLevel = map(waterRaw, 0, 4095, 0, 100);",
        mock: "float waterLevel = random(0, 100);",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"waterLevel\").c_str(), waterLevel);",
        vars: "int waterRaw = 0;\nfloat waterLevel = 0.0;",
    },
    Entry {
        id: "flow",
        label: "YF-S201 Water Flow",
        category: Liquid,
        pins: &[("Red", "5V"), ("Black", "GND"), ("Yellow", "D14")],
        include: "",
        define: "#define FLOW_PIN 14\nvolatile int flowPulses = 0;\nvoid IRAM_ATTR flowISR() { flowPulses++; }",
        setup: "pinMode(FLOW_PIN, INPUT_PULLUP);\n  attachInterrupt(digitalPinToInterrupt(FLOW_PIN), flowISR, RISING);",
        read: "float flowRate = (flowPulses / 7.5); // L/min\n  flowPulses = 0; // Reset for next second",
        mock: "float flowRate = random(0, 20);",
        send: "Firebase.setFloat(fbdo, sensorsPath(\"flowRate\").c_str(), flowRate);",
        vars: "float flowRate = 0.0;",
    },
    Entry {
        id: "mh_z19",
        label: "MH-Z19 CO2 Sensor",
        category: Environmental,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("TX", "D16"), ("RX", "D17")],
        include: "",
        define: "HardwareSerial co2Serial(2); // Use UART2",
        setup: "co2Serial.begin(9600, SERIAL_8N1, 16, 17); // RX=16, TX=17",
        read: "// Simplified CO2 Read\n  int co2 = 400; // Placeholder for actual UART read logic",
        mock: "int co2 = random(400, 1000);",
        send: "Firebase.setInt(fbdo, sensorsPath(\"co2\").c_str(), co2);",
        vars: "int co2 = 0;",
    },
    // Actuators and everything else
    Entry {
        id: "relay",
        label: "Relay Module (Control)",
        category: Other,
        pins: &[("VCC", "5V"), ("GND", "GND"), ("IN", "D5")],
        include: "",
        define: "#define RELAY_PIN 5",
        setup: "pinMode(RELAY_PIN, OUTPUT);\n  digitalWrite(RELAY_PIN, LOW); // ON",
        read: "",
        mock: "",
        send: "",
        vars: "",
    },
    Entry {
        id: "ir_speed",
        label: "IR Speed / Tachometer",
        category: Motion,
        pins: &[("VCC", "3.3V"), ("GND", "GND"), ("DO", "D18")],
        include: "",
        define: "#define RPM_PIN 18\nvolatile int rpmCount = 0;\nvoid IRAM_ATTR rpmISR() { rpmCount++; }",
        setup: "pinMode(RPM_PIN, INPUT_PULLUP);\n  attachInterrupt(digitalPinToInterrupt(RPM_PIN), rpmISR, FALLING);",
        read: "int rpm = (rpmCount * 60); // simplified pulses per sec * 60\n  rpmCount = 0;",
        mock: "int rpm = random(0, 3000);",
        send: "Firebase.setInt(fbdo, sensorsPath(\"rpm\").c_str(), rpm);",
        vars: "int rpm = 0;",
    },
];

/// Build the builtin sensor list in catalog order
pub fn builtin_sensors() -> Vec<SensorCapability> {
    ENTRIES.iter().map(Entry::to_capability).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let sensors = builtin_sensors();
        let ids: HashSet<_> = sensors.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), sensors.len());
        assert_eq!(sensors.len(), 18);
    }

    #[test]
    fn test_every_sensor_has_power_pins() {
        for sensor in builtin_sensors() {
            assert!(!sensor.pins.is_empty(), "{} has no wiring", sensor.id);
            assert!(sensor.code.define().is_some(), "{} has no define", sensor.id);
        }
    }

    #[test]
    fn test_readers_have_matching_fragments() {
        // Anything that reads also declares globals, transmits, and can be simulated
        for sensor in builtin_sensors() {
            if sensor.code.read().is_some() {
                assert!(sensor.code.vars().is_some(), "{}", sensor.id);
                assert!(sensor.code.send().is_some(), "{}", sensor.id);
                assert!(sensor.code.simulated_read().is_some(), "{}", sensor.id);
            }
        }
    }

    #[test]
    fn test_assigned_names_are_declared() {
        let typed = regex::Regex::new(r"\b(?:float|int|long|bool|char\*)\s+(\w+)\s*=").unwrap();
        for sensor in builtin_sensors() {
            let declared: HashSet<String> = sensor
                .code
                .vars()
                .map(|v| typed.captures_iter(v).map(|c| c[1].to_string()).collect())
                .unwrap_or_default();
            for fragment in [sensor.code.read(), sensor.code.simulated_read()]
                .into_iter()
                .flatten()
            {
                for cap in typed.captures_iter(fragment) {
                    assert!(
                        declared.contains(&cap[1]),
                        "{}: `{}` is not declared in vars",
                        sensor.id,
                        &cap[1]
                    );
                }
            }
        }
    }

    #[test]
    fn test_relay_is_actuator_only() {
        let relay = builtin_sensors().into_iter().find(|s| s.id == "relay").unwrap();
        assert_eq!(relay.category, SensorCategory::Other);
        assert!(relay.code.read().is_none());
        assert!(relay.code.send().is_none());
        assert!(relay.code.setup().is_some());
    }
}
