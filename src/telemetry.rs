// Logging setup.
// Installs a tracing subscriber that writes to a file, since the terminal belongs to the UI.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;
use crate::error::{FeedError, Result};

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_new(&logging.filter).map_err(|err| {
        FeedError::Config(format!("invalid log filter {}: {}", logging.filter, err))
    })?;
    let file = open_log_file(&logging.file)?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| FeedError::Other(format!("failed to install tracing subscriber: {err}")))
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}
