use crate::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the level is `info`, or
/// `debug` when `verbose` is on. With `log_file` the output is appended to that
/// file instead of stderr. Calling this twice leaves the first subscriber in place.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // Only fails when a global subscriber is already set, which then receives this
    if let Err(e) = installed {
        debug!(error = %e, "keeping the existing tracing subscriber");
    }

    Ok(())
}
