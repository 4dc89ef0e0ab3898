use anyhow::Context;
use mitsubishi2mqtt::config::MQTT_SERVER_ENV;
use mitsubishi2mqtt::identity::{self, FIRMWARE_VERSION};
use mitsubishi2mqtt::settings::NetworkMode;
use mitsubishi2mqtt::storage::StorageLayout;
use mitsubishi2mqtt::topics::Control;
use mitsubishi2mqtt::{logging, mqtt, Config, Settings};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    let cfg_path =
        std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.example.yaml".into());
    let cfg = Config::load(&cfg_path)
        .with_context(|| format!("failed to load configuration from {cfg_path}"))?;

    let layout = StorageLayout::new(&cfg.data_dir, cfg.platform);
    logging::init(Some(&layout.console()))?;
    info!(version = FIRMWARE_VERSION, config = %cfg_path, "starting mitsubishi2mqtt");
    info!(
        platform = %cfg.platform,
        data_dir = %cfg.data_dir.display(),
        "configuration loaded"
    );
    if std::env::var(MQTT_SERVER_ENV).is_ok() {
        debug!(server = %cfg.mqtt.server, "mqtt.server overridden from environment");
    }

    let device_id = match cfg.network.device_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => identity::device_id(),
    };
    let settings = Settings::resolve(&cfg, &device_id).context("invalid configuration")?;

    match &settings.network.mode {
        NetworkMode::Station { ssid, .. } => info!(
            hostname = %settings.network.hostname,
            ssid = %ssid,
            "network: station mode"
        ),
        NetworkMode::AccessPoint => warn!(
            hostname = %settings.network.hostname,
            ap_ssid = %settings.network.ap_ssid,
            open = settings.network.ap_password.is_empty(),
            "network: no wifi credentials, access point mode"
        ),
    }

    let opts = mqtt::build_options(&settings.mqtt);
    let (host, port) = opts.broker_address();
    info!(
        host = %host,
        port,
        client_id = %opts.client_id(),
        authenticated = settings.mqtt.username.is_some(),
        "mqtt options prepared"
    );

    for control in Control::iter() {
        info!(
            control = %control,
            state = settings.topics.state(control),
            set = settings.topics.set(control).unwrap_or("-"),
            "topic"
        );
    }

    let modes: Vec<String> = settings
        .unit
        .supported_modes()
        .iter()
        .map(ToString::to_string)
        .collect();
    info!(
        min_temp = settings.unit.min_temp,
        max_temp = settings.unit.max_temp,
        temp_step = settings.unit.temp_step.value(),
        modes = %modes.join(","),
        "unit customization"
    );
    info!(
        wifi_retry_ms = settings.timing.wifi.interval.as_millis() as u64,
        mqtt_retry_ms = settings.timing.mqtt.interval.as_millis() as u64,
        hp_retry_ms = settings.timing.heat_pump.interval.as_millis() as u64,
        hp_max_retries = settings.timing.heat_pump.max_retries.unwrap_or_default(),
        room_temp_interval_ms = settings.timing.room_temp_interval.as_millis() as u64,
        "timing"
    );

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
