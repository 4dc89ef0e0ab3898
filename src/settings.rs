//! Resolved, validated settings built once at startup.
//!
//! [`Settings`] is the single owned value the rest of the bridge reads from.
//! It is immutable after [`Settings::resolve`] returns; share it by reference
//! or behind an `Arc`.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::identity::{default_hostname, FIRMWARE_VERSION};
use crate::storage::StorageLayout;
use crate::timing::Timing;
use crate::topics::Topics;
use crate::unit::UnitSettings;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);
const MIN_WPA_PASSWORD_LEN: usize = 8;
const MASK_PREFIX_LEN: usize = 3;

/// Password that only shows its first characters in logs and dumps.
/// Values of three characters or fewer are fully hidden.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn masked(&self) -> String {
        if self.0.chars().count() <= MASK_PREFIX_LEN {
            return "***".to_string();
        }
        let head: String = self.0.chars().take(MASK_PREFIX_LEN).collect();
        format!("{head}***")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", self.masked())
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.masked())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NetworkMode {
    /// Join an existing network.
    Station {
        ssid: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<Secret>,
    },
    /// No stored credentials; serve the configuration access point.
    AccessPoint,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSettings {
    pub hostname: String,
    pub ap_ssid: String,
    /// Empty means an open access point.
    pub ap_password: Secret,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ota_password: Option<Secret>,
    pub mode: NetworkMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct MqttSettings {
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    pub client_id: String,
    #[serde(rename = "keep_alive_secs", serialize_with = "as_secs")]
    pub keep_alive: Duration,
}

fn as_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub version: &'static str,
    pub device_id: String,
    pub network: NetworkSettings,
    pub mqtt: MqttSettings,
    pub topics: Topics,
    pub unit: UnitSettings,
    pub timing: Timing,
    pub storage: StorageLayout,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Settings {
    pub fn resolve(config: &Config, device_id: &str) -> Result<Self> {
        let network = resolve_network(config, device_id)?;
        let mqtt = resolve_mqtt(config, &network.hostname)?;
        let topics = Topics::derive(&config.mqtt.topic)?;
        config.unit.validate()?;
        let timing = config.timing.resolve()?;

        Ok(Self {
            version: FIRMWARE_VERSION,
            device_id: device_id.to_string(),
            network,
            mqtt,
            topics,
            unit: config.unit.clone(),
            timing,
            storage: StorageLayout::new(&config.data_dir, config.platform),
        })
    }
}

fn resolve_network(config: &Config, device_id: &str) -> Result<NetworkSettings> {
    let net = &config.network;

    let hostname = match non_empty(net.hostname.as_ref()) {
        Some(h) => h.to_string(),
        None => {
            if device_id.trim().is_empty() {
                return Err(AppError::invalid(
                    "network.device_id",
                    "needed to build the default hostname",
                ));
            }
            default_hostname(device_id.trim())
        }
    };

    let ap_ssid = non_empty(net.ap_ssid.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| hostname.clone());

    let ap_password = Secret::new(net.ap_password.clone().unwrap_or_default());
    let ap_len = ap_password.expose().chars().count();
    if !ap_password.is_empty() && ap_len < MIN_WPA_PASSWORD_LEN {
        return Err(AppError::invalid(
            "network.ap_password",
            format!("must be empty or at least {MIN_WPA_PASSWORD_LEN} characters"),
        ));
    }

    let ota_password = non_empty(net.ota_password.as_ref()).map(Secret::new);

    let mode = match &net.wifi {
        Some(wifi) if !wifi.ssid.trim().is_empty() => NetworkMode::Station {
            ssid: wifi.ssid.clone(),
            password: wifi.password.clone().map(Secret::new),
        },
        _ => NetworkMode::AccessPoint,
    };

    Ok(NetworkSettings {
        hostname,
        ap_ssid,
        ap_password,
        ota_password,
        mode,
    })
}

fn resolve_mqtt(config: &Config, hostname: &str) -> Result<MqttSettings> {
    let mqtt = &config.mqtt;
    if mqtt.port == 0 {
        return Err(AppError::invalid("mqtt.port", "port cannot be 0"));
    }

    let username = non_empty(mqtt.username.as_ref()).map(str::to_string);
    let password = mqtt.password.clone().map(Secret::new);
    if password.is_some() && username.is_none() {
        return Err(AppError::invalid(
            "mqtt.password",
            "a password requires a username",
        ));
    }

    let keep_alive = match mqtt.keep_alive_secs {
        None => DEFAULT_KEEP_ALIVE,
        Some(0) => return Err(AppError::invalid("mqtt.keep_alive_secs", "must be positive")),
        // CONNECT carries keep-alive as a 16-bit second count
        Some(secs) if secs > u64::from(u16::MAX) => {
            return Err(AppError::invalid(
                "mqtt.keep_alive_secs",
                format!("must be at most {}", u16::MAX),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
    };

    Ok(MqttSettings {
        server: mqtt.server.trim().to_string(),
        port: mqtt.port,
        username,
        password,
        client_id: non_empty(mqtt.client_id.as_ref())
            .unwrap_or(hostname)
            .to_string(),
        keep_alive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(yaml: &str) -> Config {
        Config::parse(yaml).unwrap()
    }

    #[test]
    fn test_defaults_from_device_id() {
        let cfg = config("mqtt:\n  server: broker\n");
        let settings = Settings::resolve(&cfg, "ABC123").unwrap();

        assert_eq!(settings.version, "2022.01");
        assert_eq!(settings.network.hostname, "HVAC_ABC123");
        assert_eq!(settings.network.ap_ssid, "HVAC_ABC123");
        assert!(settings.network.ap_password.is_empty());
        assert_eq!(settings.network.mode, NetworkMode::AccessPoint);
        assert_eq!(settings.mqtt.client_id, "HVAC_ABC123");
        assert_eq!(settings.mqtt.keep_alive, Duration::from_secs(30));
        assert_eq!(settings.topics.main, "mitsubishi");
    }

    #[test]
    fn test_blank_hostname_falls_back() {
        let cfg = config("network:\n  hostname: \"  \"\nmqtt:\n  server: broker\n");
        let settings = Settings::resolve(&cfg, "00FF00").unwrap();
        assert_eq!(settings.network.hostname, "HVAC_00FF00");
    }

    #[test]
    fn test_missing_device_id_without_hostname() {
        let cfg = config("mqtt:\n  server: broker\n");
        assert!(Settings::resolve(&cfg, "").is_err());
    }

    #[test]
    fn test_station_mode_with_wifi() {
        let cfg = config(
            "network:\n  wifi:\n    ssid: home\n    password: wifipass\nmqtt:\n  server: broker\n",
        );
        let settings = Settings::resolve(&cfg, "ABC123").unwrap();
        match settings.network.mode {
            NetworkMode::Station { ssid, password } => {
                assert_eq!(ssid, "home");
                assert_eq!(password.unwrap().expose(), "wifipass");
            }
            other => panic!("expected station mode, got {other:?}"),
        }
    }

    #[test]
    fn test_short_ap_password_rejected() {
        let cfg = config("network:\n  ap_password: short\nmqtt:\n  server: broker\n");
        let err = Settings::resolve(&cfg, "ABC123").unwrap_err();
        assert!(err.to_string().contains("ap_password"));
    }

    #[test]
    fn test_mqtt_password_needs_username() {
        let cfg = config("mqtt:\n  server: broker\n  password: pw\n");
        assert!(Settings::resolve(&cfg, "ABC123").is_err());
    }

    #[test]
    fn test_invalid_unit_propagates() {
        let cfg = config("mqtt:\n  server: broker\nunit:\n  min_temp: 30\n  max_temp: 20\n");
        assert!(Settings::resolve(&cfg, "ABC123").is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let cfg = config("mqtt:\n  server: broker\n  port: 0\n");
        let err = Settings::resolve(&cfg, "ABC123").unwrap_err();
        assert!(err.to_string().contains("mqtt.port"));
    }

    #[test]
    fn test_keep_alive_bounds() {
        let zero = config("mqtt:\n  server: broker\n  keep_alive_secs: 0\n");
        assert!(Settings::resolve(&zero, "ABC123").is_err());

        let max = config("mqtt:\n  server: broker\n  keep_alive_secs: 65535\n");
        let settings = Settings::resolve(&max, "ABC123").unwrap();
        assert_eq!(settings.mqtt.keep_alive, Duration::from_secs(65_535));

        for too_big in ["65536", "70000", "9223372036854775807"] {
            let cfg = config(&format!(
                "mqtt:\n  server: broker\n  keep_alive_secs: {too_big}\n"
            ));
            let err = Settings::resolve(&cfg, "ABC123").unwrap_err();
            assert!(err.to_string().contains("keep_alive_secs"), "{too_big}: {err}");
        }
    }

    #[test]
    fn test_nul_in_main_topic_rejected() {
        let cfg = config("mqtt:\n  server: broker\n  topic: \"home\\0hvac\"\n");
        assert!(cfg.mqtt.topic.contains('\0'));
        assert!(Settings::resolve(&cfg, "ABC123").is_err());
    }

    #[test]
    fn test_short_secret_fully_masked() {
        for short in ["", "p", "pw", "abc"] {
            let secret = Secret::new(short);
            assert_eq!(serde_json::to_value(&secret).unwrap(), "***");
            assert_eq!(format!("{secret:?}"), "Secret(***)");
        }
        assert_eq!(serde_json::to_value(Secret::new("abcd")).unwrap(), "abc***");

        let cfg = config("mqtt:\n  server: broker\n  username: u\n  password: pw\n");
        let settings = Settings::resolve(&cfg, "ABC123").unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"password\":\"***\""));
        assert!(!json.contains("pw***"));
    }

    #[test]
    fn test_secret_masking() {
        let secret = Secret::new("hunter22");
        assert_eq!(format!("{secret:?}"), "Secret(hun***)");
        assert_eq!(serde_json::to_value(&secret).unwrap(), "hun***");
        assert_eq!(secret.expose(), "hunter22");
    }
}
