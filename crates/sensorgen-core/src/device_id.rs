//! Device identifiers assigned to newly registered machines

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of generated device ids
pub const DEVICE_ID_PREFIX: &str = "MACHINE-";

/// Number of random characters after the prefix
pub const DEVICE_ID_SUFFIX_LEN: usize = 8;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Device id embedded into firmware and used as the database key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random id such as `MACHINE-3FZTIH1K`
    pub fn generate() -> Self {
        let mut n = Uuid::new_v4().as_u128();
        let mut id = String::with_capacity(DEVICE_ID_PREFIX.len() + DEVICE_ID_SUFFIX_LEN);
        id.push_str(DEVICE_ID_PREFIX);
        for _ in 0..DEVICE_ID_SUFFIX_LEN {
            id.push(BASE36[(n % 36) as usize] as char);
            n /= 36;
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
