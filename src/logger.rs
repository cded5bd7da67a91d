//! Logging setup built on the `log` facade and `fern`.

use std::path::PathBuf;

use anyhow::Result;
use log::LevelFilter;

use crate::config::LoggingConfig;

/// Path of the log file when file logging is enabled.
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("listling")
        .join("listling.log")
}

/// Initialize the global logger from configuration.
///
/// With logging disabled everything below `warn` is dropped and nothing is
/// written to disk; warnings still reach stderr.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(
            fern::Dispatch::new()
                .level(LevelFilter::Warn)
                .chain(std::io::stderr()),
        );

    if config.enabled {
        let path = log_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(LevelFilter::Debug)
                .chain(fern::log_file(path)?),
        );
    }

    dispatch.apply()?;
    Ok(())
}
