use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::warn;

pub const WIFI_RETRY_INTERVAL: Duration = Duration::from_millis(300_000);
pub const MQTT_RETRY_INTERVAL: Duration = Duration::from_millis(5_000);
pub const HP_RETRY_INTERVAL: Duration = Duration::from_millis(1_000);
pub const HP_MAX_RETRIES: u32 = 5;
pub const HP_MAX_RETRIES_RANGE: RangeInclusive<u32> = 1..=10;
/// Publishing room temperature more often makes the reading bounce.
pub const ROOM_TEMP_PUBLISH_INTERVAL: Duration = Duration::from_millis(45_000);

fn as_millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    #[serde(rename = "interval_ms", serialize_with = "as_millis")]
    pub interval: Duration,
    /// `None` retries forever.
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    pub const fn forever(interval: Duration) -> Self {
        Self {
            interval,
            max_retries: None,
        }
    }

    pub const fn limited(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries: Some(max_retries),
        }
    }

    /// Whether another attempt may follow `attempts_made` failed ones.
    pub fn allows(&self, attempts_made: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts_made < max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub wifi: RetryPolicy,
    pub mqtt: RetryPolicy,
    pub heat_pump: RetryPolicy,
    #[serde(rename = "room_temp_interval_ms", serialize_with = "as_millis")]
    pub room_temp_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wifi: RetryPolicy::forever(WIFI_RETRY_INTERVAL),
            mqtt: RetryPolicy::forever(MQTT_RETRY_INTERVAL),
            heat_pump: RetryPolicy::limited(HP_RETRY_INTERVAL, HP_MAX_RETRIES),
            room_temp_interval: ROOM_TEMP_PUBLISH_INTERVAL,
        }
    }
}

/// Optional overrides from the config file, all in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub wifi_retry_interval_ms: Option<u64>,
    pub mqtt_retry_interval_ms: Option<u64>,
    pub hp_retry_interval_ms: Option<u64>,
    pub hp_max_retries: Option<u32>,
    pub room_temp_interval_ms: Option<u64>,
}

fn interval(field: &'static str, value: Option<u64>, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(0) => Err(AppError::invalid(field, "interval must be greater than zero")),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}

impl TimingConfig {
    pub fn resolve(&self) -> Result<Timing> {
        let max_retries = self.hp_max_retries.unwrap_or(HP_MAX_RETRIES);
        if !HP_MAX_RETRIES_RANGE.contains(&max_retries) {
            return Err(AppError::invalid(
                "timing.hp_max_retries",
                format!(
                    "{max_retries} is outside {}..={}",
                    HP_MAX_RETRIES_RANGE.start(),
                    HP_MAX_RETRIES_RANGE.end()
                ),
            ));
        }

        let room_temp_interval = interval(
            "timing.room_temp_interval_ms",
            self.room_temp_interval_ms,
            ROOM_TEMP_PUBLISH_INTERVAL,
        )?;
        if room_temp_interval < ROOM_TEMP_PUBLISH_INTERVAL {
            warn!(
                interval_ms = room_temp_interval.as_millis() as u64,
                "room temperature interval below 45s, readings may bounce"
            );
        }

        Ok(Timing {
            wifi: RetryPolicy::forever(interval(
                "timing.wifi_retry_interval_ms",
                self.wifi_retry_interval_ms,
                WIFI_RETRY_INTERVAL,
            )?),
            mqtt: RetryPolicy::forever(interval(
                "timing.mqtt_retry_interval_ms",
                self.mqtt_retry_interval_ms,
                MQTT_RETRY_INTERVAL,
            )?),
            heat_pump: RetryPolicy::limited(
                interval(
                    "timing.hp_retry_interval_ms",
                    self.hp_retry_interval_ms,
                    HP_RETRY_INTERVAL,
                )?,
                max_retries,
            ),
            room_temp_interval,
        })
    }
}
