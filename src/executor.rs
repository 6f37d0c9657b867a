/*!
 * Process execution collaborator
 *
 * The operations layer never spawns smbclient directly; it goes through the
 * `ClientExecutor` capability so tests can substitute a mock via constructor
 * injection. The real executor resolves the binary, spawns it with the
 * invocation's environment overlay and captures stdout and stderr combined.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

use tracing::{debug, error, info};

use crate::command::{sanitize_invocation, Invocation};
use crate::error::SmbError;

/// Environment variable overriding the smbclient binary location
pub const BINARY_PATH_ENV: &str = "SMBCLIENT_PATH";

/// Last-resort binary location when nothing else resolves
const FALLBACK_BINARY: &str = "/usr/bin/smbclient";

/// Well-known installation locations checked before a PATH search
const KNOWN_BINARY_PATHS: &[&str] = &[
    "/usr/bin/smbclient",
    "/bin/smbclient",
    "/usr/local/bin/smbclient",
];

/// Captured outcome of one smbclient attempt: combined stdout+stderr text and
/// the execution error, if any. Consumed immediately by classification; never
/// stored beyond one attempt.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub output: String,
    pub error: Option<SmbError>,
}

impl ExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(output: impl Into<String>, error: SmbError) -> Self {
        Self {
            output: output.into(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Capability interface for running one smbclient invocation.
///
/// Implementations must be safe for concurrent use; the facade shares one
/// executor across calls. Environment overlay and command logging are part of
/// the contract for every implementation.
pub trait ClientExecutor: Send + Sync {
    fn execute(&self, invocation: &Invocation, log_commands: bool) -> ExecutionResult;
}

/// Executor backed by the real smbclient binary.
#[derive(Debug, Default)]
pub struct SmbclientExecutor {
    /// Explicit binary path; when `None` the path is resolved per call
    pub binary_path: Option<PathBuf>,
}

impl SmbclientExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: Some(path.into()),
        }
    }

    fn binary(&self) -> PathBuf {
        match &self.binary_path {
            Some(path) => path.clone(),
            None => resolve_binary_path(),
        }
    }
}

impl ClientExecutor for SmbclientExecutor {
    fn execute(&self, invocation: &Invocation, log_commands: bool) -> ExecutionResult {
        let binary = self.binary();

        if log_commands {
            let sanitized = sanitize_invocation(invocation);
            info!(
                "executing smbclient: {} {}",
                binary.display(),
                sanitized.args.join(" ")
            );
            if !sanitized.env.is_empty() {
                debug!("environment overlay: {:?}", sanitized.env);
            }
        }

        let mut cmd = Command::new(&binary);
        cmd.args(&invocation.args);
        // Overlay on top of the inherited environment
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        match cmd.output() {
            Ok(captured) => {
                let mut output = String::from_utf8_lossy(&captured.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&captured.stderr));

                if captured.status.success() {
                    if log_commands {
                        debug!("smbclient succeeded, output: {}", output);
                    }
                    ExecutionResult::ok(output)
                } else {
                    if log_commands {
                        error!("smbclient failed with {}", captured.status);
                        if !output.is_empty() {
                            error!("smbclient output: {}", output);
                        }
                    }
                    let err = SmbError::generic(format!(
                        "smbclient command failed: {} (output: {})",
                        captured.status, output
                    ));
                    ExecutionResult::failed(output, err)
                }
            }
            Err(spawn_err) => {
                if log_commands {
                    error!("failed to spawn {}: {}", binary.display(), spawn_err);
                }
                ExecutionResult::failed(
                    String::new(),
                    SmbError::generic(format!(
                        "failed to spawn {}: {}",
                        binary.display(),
                        spawn_err
                    )),
                )
            }
        }
    }
}

/// Resolve the smbclient binary location.
///
/// Order: explicit override variable, validated well-known locations, PATH
/// search, hardcoded fallback. Every candidate except the fallback must be a
/// regular file with at least one execute bit set.
pub fn resolve_binary_path() -> PathBuf {
    if let Ok(override_path) = env::var(BINARY_PATH_ENV) {
        let candidate = PathBuf::from(&override_path);
        if is_executable_file(&candidate) {
            return candidate;
        }
    }

    for known in KNOWN_BINARY_PATHS {
        let candidate = PathBuf::from(known);
        if is_executable_file(&candidate) {
            return candidate;
        }
    }

    if let Some(found) = search_path("smbclient") {
        return found;
    }

    PathBuf::from(FALLBACK_BINARY)
}

/// Check that a path names a regular file with an execute bit set.
pub fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable_file(candidate))
}
