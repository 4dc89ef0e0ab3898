//! Naming convention of the persisted configuration files.
//!
//! The two supported microcontroller families name the same files
//! differently: ESP32 builds use absolute names on the flash filesystem,
//! ESP8266 builds use bare names. On a host the names are resolved under a
//! data directory.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Esp32,
    #[default]
    Esp8266,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ConfigFile {
    Wifi,
    Mqtt,
    Unit,
    Console,
}

impl Platform {
    pub fn file_name(self, file: ConfigFile) -> &'static str {
        match (self, file) {
            (Platform::Esp32, ConfigFile::Wifi) => "/wifi.json",
            (Platform::Esp32, ConfigFile::Mqtt) => "/mqtt.json",
            // ESP32 builds keep the unit customization in advance.json
            (Platform::Esp32, ConfigFile::Unit) => "/advance.json",
            (Platform::Esp32, ConfigFile::Console) => "/console.log",
            (Platform::Esp8266, ConfigFile::Wifi) => "wifi.json",
            (Platform::Esp8266, ConfigFile::Mqtt) => "mqtt.json",
            (Platform::Esp8266, ConfigFile::Unit) => "unit.json",
            (Platform::Esp8266, ConfigFile::Console) => "console.log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    platform: Platform,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn path(&self, file: ConfigFile) -> PathBuf {
        let name = self.platform.file_name(file).trim_start_matches('/');
        self.root.join(name)
    }

    pub fn wifi(&self) -> PathBuf {
        self.path(ConfigFile::Wifi)
    }

    pub fn mqtt(&self) -> PathBuf {
        self.path(ConfigFile::Mqtt)
    }

    pub fn unit(&self) -> PathBuf {
        self.path(ConfigFile::Unit)
    }

    pub fn console(&self) -> PathBuf {
        self.path(ConfigFile::Console)
    }

    pub fn exists(&self, file: ConfigFile) -> bool {
        self.path(file).is_file()
    }
}

impl Serialize for StorageLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ConfigFile::iter().count() + 1))?;
        map.serialize_entry("platform", &self.platform)?;
        for file in ConfigFile::iter() {
            map.serialize_entry(&file.to_string(), &self.path(file))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_esp32_file_names() {
        let names: Vec<_> = ConfigFile::iter()
            .map(|f| Platform::Esp32.file_name(f))
            .collect();
        assert_eq!(
            names,
            vec!["/wifi.json", "/mqtt.json", "/advance.json", "/console.log"]
        );
    }

    #[test]
    fn test_esp8266_file_names() {
        let names: Vec<_> = ConfigFile::iter()
            .map(|f| Platform::Esp8266.file_name(f))
            .collect();
        assert_eq!(names, vec!["wifi.json", "mqtt.json", "unit.json", "console.log"]);
    }

    #[test]
    fn test_paths_resolve_under_root() {
        let esp32 = StorageLayout::new("/var/lib/m2mqtt", Platform::Esp32);
        assert_eq!(esp32.unit(), PathBuf::from("/var/lib/m2mqtt/advance.json"));
        assert_eq!(esp32.console(), PathBuf::from("/var/lib/m2mqtt/console.log"));

        let esp8266 = StorageLayout::new("data", Platform::Esp8266);
        assert_eq!(esp8266.wifi(), PathBuf::from("data/wifi.json"));
        assert_eq!(esp8266.mqtt(), PathBuf::from("data/mqtt.json"));
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("esp32".parse::<Platform>().unwrap(), Platform::Esp32);
        assert_eq!(Platform::default(), Platform::Esp8266);
        assert!("avr".parse::<Platform>().is_err());
    }

    #[test]
    fn test_exists_checks_files_only() {
        let root = std::env::temp_dir().join(format!("m2mqtt-storage-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let layout = StorageLayout::new(&root, Platform::Esp8266);

        assert!(!layout.exists(ConfigFile::Wifi));
        std::fs::write(layout.wifi(), "{}").unwrap();
        assert!(layout.exists(ConfigFile::Wifi));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_layout_serializes_paths() {
        let layout = StorageLayout::new("data", Platform::Esp32);
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["platform"], "esp32");
        assert_eq!(json["unit"], "data/advance.json");
    }
}
