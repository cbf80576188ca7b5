//! Logging initialization.
//!
//! Installs a `tracing` fmt subscriber writing to stderr so that stdout
//! stays reserved for reports. Resolver fallbacks are logged at WARN.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global subscriber. `verbose` lowers the level to DEBUG.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn initialize_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
