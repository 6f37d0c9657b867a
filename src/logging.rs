/*!
 * Logging initialization for the CLI binary
 */

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging.
///
/// Honors `RUST_LOG` when set; otherwise logs this crate at info level, or
/// debug when `verbose` is requested.
pub fn init(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smbrelay={}", default_level)));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
