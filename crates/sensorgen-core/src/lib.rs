//! sensorgen Core - Sensor catalog and firmware source generation
//!
//! This crate provides the building blocks of the sensorgen system:
//! - Sensor capability registry with wiring and per-sensor code fragments
//! - Generation requests (device id, enabled sensors, network credentials)
//! - Firmware source generator assembling an ESP32 sketch from fragments
//! - Wiring guide for the enabled sensors
//! - Device id generation for newly registered machines

pub mod catalog;
pub mod device_id;
pub mod generator;
pub mod registry;
pub mod request;
pub mod sensor;
pub mod template;
pub mod wiring;

pub use device_id::DeviceId;
pub use generator::{FirmwareGenerator, GeneratedProgram, GeneratorOptions};
pub use registry::{RegistryError, RegistryFile, SensorQuery, SensorRegistry};
pub use request::{GenerationRequest, NetworkCredentials};
pub use sensor::{CodeFragments, PinAssignment, SensorCapability, SensorCategory};
pub use wiring::{WiringEntry, WiringGuide};
