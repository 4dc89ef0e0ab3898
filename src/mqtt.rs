use crate::settings::MqttSettings;
use rumqttc::{MqttOptions, Transport};
use tracing::debug;

pub const TLS_PORT: u16 = 8883;

/// Connection options for the broker described by `settings`.
///
/// Only builds options; connecting and reconnecting stay with the caller,
/// which should wait `Timing::mqtt.interval` between attempts.
pub fn build_options(settings: &MqttSettings) -> MqttOptions {
    let mut opts = MqttOptions::new(
        settings.client_id.clone(),
        settings.server.clone(),
        settings.port,
    );
    opts.set_keep_alive(settings.keep_alive);
    opts.set_clean_session(true);

    match (&settings.username, &settings.password) {
        (Some(user), Some(pass)) => {
            opts.set_credentials(user.clone(), pass.expose().to_string());
        }
        (Some(user), None) => {
            opts.set_credentials(user.clone(), String::new());
        }
        _ => debug!("mqtt authentication disabled (anonymous)"),
    }

    if settings.port == TLS_PORT {
        opts.set_transport(Transport::tls_with_default_config());
    }
    opts
}
