/*!
 * smbrelay - SMB file relay operations layer
 *
 * Relays file operations (list, upload, delete, health check) onto a remote
 * SMB share by driving the `smbclient` binary as a subprocess and interpreting
 * its text output:
 * - Command synthesis across negotiate/NTLM/Kerberos auth modes, with secrets
 *   passed through the environment rather than argv
 * - Exponential-backoff retry that distinguishes transient network failures
 *   from permanent protocol errors
 * - A typed error taxonomy recovered from smbclient's vendor status tokens
 * - Transparent base-path scoping of all remote paths
 */

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod listing;
pub mod logging;
pub mod ops;
pub mod path;
pub mod retry;

// Re-export commonly used types
pub use command::{build_invocation, sanitize_invocation, Invocation};
pub use config::SmbConfig;
pub use error::{ErrorKind, Result, SmbError};
pub use executor::{ClientExecutor, ExecutionResult, SmbclientExecutor};
pub use listing::FileEntry;
pub use ops::{HealthCheckResult, SmbOperations};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
