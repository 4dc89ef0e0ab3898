//! Configuration core of a bridge between a Mitsubishi heat pump and an MQTT
//! broker: identity, persisted-file layout, credentials, topic names, unit
//! customization and timing, resolved once into a [`Settings`] value.

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod mqtt;
pub mod settings;
pub mod storage;
pub mod timing;
pub mod topics;
pub mod unit;

pub use config::Config;
pub use error::{AppError, Result};
pub use settings::Settings;
