use crate::error::{AppError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SESSION_SEPARATOR: &[u8] = b"\n=================================================\n\n";

/// Install the global subscriber: compact output on stdout and, when
/// `console_file` is given, a plain-text copy appended to that file.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init(console_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = match console_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().append(true).create(true).open(path)?)
        }
        None => None,
    };
    let file_layer = match &console {
        Some(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file.try_clone()?))
                .with_ansi(false)
                .with_target(false),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    // Only mark a new session once this subscriber owns the file.
    if let Some(mut file) = console {
        file.write_all(SESSION_SEPARATOR)?;
    }
    Ok(())
}
