//! Logging setup
//!
//! Two sinks: the console (stderr, `warn` by default, raised by `-v` or
//! replaced by `BGT_RELEASE_LOG`) and the run log file (`info`, no ANSI,
//! truncated on every run).

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Environment variable overriding the console filter
pub const LOG_ENV: &str = "BGT_RELEASE_LOG";

/// Console level for a `-v` count
pub fn console_level(verbose: u8) -> &'static str {
  match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

/// Install the global subscriber. Without `log_file` only the console sink is
/// used; a log file that cannot be created is reported and skipped.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) {
  let console_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(console_level(verbose)));
  let console = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(verbose >= 2)
    .with_filter(console_filter);

  let mut file_error = None;
  let file_layer = log_file.and_then(|path| match File::create(path) {
    Ok(file) => Some(
      fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO),
    ),
    Err(e) => {
      file_error = Some((path.to_path_buf(), e));
      None
    }
  });

  // Already installed (tests); keep the existing subscriber
  let _ = tracing_subscriber::registry().with(console).with(file_layer).try_init();

  if let Some((path, e)) = file_error {
    tracing::warn!("Cannot create log file {}: {}; logging to console only", path.display(), e);
  }
  tracing::debug!("bgt-release {} started, verbosity {}", env!("CARGO_PKG_VERSION"), verbose);
}
