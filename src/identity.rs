//! Firmware identity and device naming.

use std::fs;
use tracing::{debug, warn};
use uuid::Uuid;

pub const FIRMWARE_VERSION: &str = "2022.01";

/// Prepended to the device id to form the default hostname.
pub const HOSTNAME_PREFIX: &str = "HVAC_";

const MACHINE_ID_PATH: &str = "/etc/machine-id";
const DEVICE_ID_LEN: usize = 6;

/// Short hardware-ish identifier for this host.
///
/// Taken from `/etc/machine-id` when readable, otherwise from a random UUID,
/// so two bridges on the same broker still get distinct hostnames.
pub fn device_id() -> String {
    match fs::read_to_string(MACHINE_ID_PATH) {
        Ok(raw) => {
            if let Some(id) = device_id_from(&raw) {
                debug!(device_id = %id, "device id derived from machine id");
                return id;
            }
            warn!(path = MACHINE_ID_PATH, "machine id has too few hex digits");
        }
        Err(e) => warn!(path = MACHINE_ID_PATH, error = %e, "machine id not readable"),
    }

    let random = Uuid::new_v4().simple().to_string();
    device_id_from(&random).unwrap_or_else(|| random[..DEVICE_ID_LEN].to_uppercase())
}

/// Last six hex digits of `machine_id`, upper-cased.
pub fn device_id_from(machine_id: &str) -> Option<String> {
    let hex: Vec<char> = machine_id
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect();
    if hex.len() < DEVICE_ID_LEN {
        return None;
    }
    let tail: String = hex[hex.len() - DEVICE_ID_LEN..].iter().collect();
    Some(tail.to_uppercase())
}

pub fn default_hostname(device_id: &str) -> String {
    format!("{HOSTNAME_PREFIX}{device_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_from_machine_id() {
        let id = device_id_from("4c4c4544003957108052b4c04f384833\n").unwrap();
        assert_eq!(id, "384833");
    }

    #[test]
    fn test_device_id_ignores_separators() {
        let id = device_id_from("de:ad:be:ef:ca:fe").unwrap();
        assert_eq!(id, "EFCAFE");
    }

    #[test]
    fn test_device_id_too_short() {
        assert_eq!(device_id_from("abc"), None);
        assert_eq!(device_id_from(""), None);
    }

    #[test]
    fn test_device_id_shape() {
        let id = device_id();
        assert_eq!(id.len(), DEVICE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_default_hostname() {
        assert_eq!(default_hostname("A1B2C3"), "HVAC_A1B2C3");
    }
}
