use crate::error::{AppError, Result};
use crate::storage::Platform;
use crate::timing::TimingConfig;
use crate::unit::UnitSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Env var that replaces `mqtt.server` after the file is parsed.
pub const MQTT_SERVER_ENV: &str = "MQTT_SERVER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selects the persisted file naming convention.
    #[serde(default)]
    pub platform: Platform,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub network: NetworkConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub unit: UnitSettings,
    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Empty or absent means `HVAC_<device id>`.
    pub hostname: Option<String>,
    /// Overrides the id read from the host.
    pub device_id: Option<String>,
    pub ap_ssid: Option<String>,
    pub ap_password: Option<String>,
    pub ota_password: Option<String>,
    /// Without credentials the bridge stays in access-point mode.
    pub wifi: Option<WifiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    /// Main topic every state/set topic is derived from.
    #[serde(default = "default_topic")]
    pub topic: String,
    pub keep_alive_secs: Option<u64>,
}

fn default_port() -> u16 {
    1883
}

fn default_topic() -> String {
    "mitsubishi".into()
}

impl Config {
    /// Read YAML from `path`, expand `$(VAR)`/`${VAR}` placeholders, parse,
    /// then apply the `MQTT_SERVER` override.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut cfg = Self::parse(&raw)?;

        if let Ok(server) = env::var(MQTT_SERVER_ENV) {
            cfg.mqtt.server = server;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let expanded = expand_env_placeholders(raw)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    fn validate(&self) -> Result<()> {
        if self.mqtt.server.trim().is_empty() {
            return Err(AppError::Config("mqtt.server cannot be empty".into()));
        }
        Ok(())
    }
}

/// Substitute `$(VAR)` and `${VAR}` with environment values.
///
/// `$$` yields a literal `$`; any other `$` is kept as-is. Unknown variables
/// and unterminated placeholders are errors.
fn expand_env_placeholders(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let close = match after.chars().next() {
            Some('$') => {
                out.push('$');
                rest = &after[1..];
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                rest = after;
                continue;
            }
        };

        let body = &after[1..];
        let end = body.find(close).ok_or_else(|| {
            AppError::Config(format!("unterminated env placeholder: missing '{close}'"))
        })?;
        let name = &body[..end];
        let value = env::var(name)
            .map_err(|_| AppError::Config(format!("missing environment variable: {name}")))?;
        out.push_str(&value);
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
