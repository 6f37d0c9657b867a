/*!
 * SMB operations facade
 *
 * The four public operations: list, upload, delete and health check. Each call
 * synthesizes an invocation, runs it through the retry executor and interprets
 * the captured output. The facade is stateless and reentrant; concurrent calls
 * share only the injected executor.
 */

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::command::build_invocation;
use crate::config::SmbConfig;
use crate::error::{ErrorKind, Result, SmbError};
use crate::executor::{ClientExecutor, ExecutionResult, SmbclientExecutor};
use crate::listing::{classify_output, parse_listing, FileEntry};
use crate::path::{build_full_path, join_smb_paths, normalize_path_segment};
use crate::retry::execute_with_retry;

const STATUS_HEALTHY: &str = "healthy";
const STATUS_UNHEALTHY: &str = "unhealthy";
const STATUS_OK: &str = "ok";
const STATUS_FAILED: &str = "failed";

/// Marker smbclient prints while transferring; its absence after a clean exit
/// means the put silently did nothing.
const UPLOAD_PROGRESS_MARKER: &str = "putting file";

/// Outcome of a health probe against the server, share and optional base path.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub status: String,
    pub app_status: String,
    pub smb_connection: String,
    pub server: String,
    pub share: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub smb_share_accessible: bool,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }
}

/// Facade over smbclient for file relay operations.
///
/// Holds only the process-execution collaborator; every call receives its
/// configuration by reference and builds all per-call state fresh.
pub struct SmbOperations {
    executor: Arc<dyn ClientExecutor>,
}

impl Default for SmbOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl SmbOperations {
    /// Facade backed by the real smbclient binary
    pub fn new() -> Self {
        Self::with_executor(Arc::new(SmbclientExecutor::new()))
    }

    /// Facade with an injected executor (tests substitute a mock here)
    pub fn with_executor(executor: Arc<dyn ClientExecutor>) -> Self {
        Self { executor }
    }

    /// Build the invocation for `command` and run it through the retry
    /// executor. Configuration problems fail here without spawning anything.
    fn run(&self, operation: &str, cfg: &SmbConfig, command: &str) -> Result<ExecutionResult> {
        let invocation = build_invocation(cfg, command)?;
        Ok(execute_with_retry(operation, cfg, || {
            self.executor.execute(&invocation, cfg.log_commands)
        }))
    }

    /// List files and directories at `remote_path` (relative to the configured
    /// base path). Entry order follows smbclient's own output order.
    pub fn list_files(&self, remote_path: &str, cfg: &SmbConfig) -> Result<Vec<FileEntry>> {
        let full_path = build_full_path(remote_path, cfg);
        let command = if full_path.is_empty() || full_path == "." {
            "ls".to_string()
        } else {
            format!("cd \"{}\"; ls", full_path)
        };

        let result = self.run("list files", cfg, &command)?;
        if let Some(err) = result.error {
            return Err(match classify_output(&result.output) {
                Some(ErrorKind::NotFound) => {
                    SmbError::not_found(format!("path not found: {}", remote_path))
                }
                Some(ErrorKind::AccessDenied) => {
                    SmbError::access_denied(format!("access denied to path: {}", remote_path))
                }
                _ => SmbError::generic(format!("failed to list files: {}", err)),
            });
        }

        Ok(parse_listing(&result.output))
    }

    /// Upload a local file to `remote_path` on the share.
    ///
    /// With `overwrite` disabled an existence probe runs first; the probe is
    /// permissive — only an explicit "already there" signal blocks the upload,
    /// a failed probe is treated as "does not exist".
    pub fn upload_file(
        &self,
        local_path: &Path,
        remote_path: &str,
        cfg: &SmbConfig,
        overwrite: bool,
    ) -> Result<()> {
        // The guard works on the caller's path, not the resolved one: an
        // empty caller path means "scope root, original filename" and must
        // not be probed (a probe of the base directory always succeeds)
        let relative = normalize_path_segment(remote_path);
        let has_target_name = !relative.is_empty() && relative != ".";

        if !overwrite && has_target_name {
            let target = build_full_path(remote_path, cfg);
            let probe = self.run(
                "upload existence probe",
                cfg,
                &format!("ls \"{}\"", target),
            )?;
            // A successful ls of the target means it exists: the output either
            // names it or carries the listing's blocks summary
            if probe.is_ok()
                && (probe.output.contains(&target) || probe.output.contains("blocks of size"))
            {
                return Err(SmbError::already_exists(format!(
                    "remote file already exists: {}",
                    target
                )));
            }
        }

        if !local_path.exists() {
            return Err(SmbError::not_found(format!(
                "local file not found: {}",
                local_path.display()
            )));
        }
        let Some(file_name) = local_path.file_name() else {
            return Err(SmbError::invalid_parameters(format!(
                "invalid local path: {}",
                local_path.display()
            )));
        };

        let full_path = if has_target_name {
            build_full_path(remote_path, cfg)
        } else {
            join_smb_paths(&cfg.base_path, &file_name.to_string_lossy())
        };

        // Best-effort parent creation; it may already exist
        let remote_dir = match full_path.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        };
        if !remote_dir.is_empty() && remote_dir != "." {
            let _ = self.run(
                "create parent directory",
                cfg,
                &format!("mkdir \"{}\"", remote_dir),
            )?;
        }

        let local_dir = local_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let command = format!(
            "lcd \"{}\"; put \"{}\" \"{}\"",
            local_dir.display(),
            file_name.to_string_lossy(),
            full_path
        );

        let result = self.run("upload file", cfg, &command)?;
        if let Some(err) = result.error {
            let parent_display = if remote_dir.is_empty() { "." } else { remote_dir };
            return Err(match classify_output(&result.output) {
                Some(ErrorKind::AlreadyExists) => SmbError::already_exists(format!(
                    "remote file already exists: {}",
                    full_path
                )),
                Some(ErrorKind::AccessDenied) => SmbError::access_denied(format!(
                    "access denied: cannot write to {}",
                    full_path
                )),
                Some(ErrorKind::NotFound) => SmbError::not_found(format!(
                    "remote path not found: {}",
                    parent_display
                )),
                _ => SmbError::generic(format!("failed to upload file: {}", err)),
            });
        }

        // smbclient can exit zero without transferring anything; treat a
        // missing progress marker as failure rather than silent success
        if !result.output.contains(UPLOAD_PROGRESS_MARKER) {
            return Err(SmbError::generic(
                "upload may have failed: unexpected output",
            ));
        }

        Ok(())
    }

    /// Delete a file at `remote_path` on the share.
    pub fn delete_file(&self, remote_path: &str, cfg: &SmbConfig) -> Result<()> {
        // Guard the caller's path before base joining, so a configured base
        // path cannot turn an empty path into a delete of the scope root
        let relative = normalize_path_segment(remote_path);
        if relative.is_empty() || relative == "." {
            return Err(SmbError::invalid_parameters(
                "invalid remote path: cannot delete root directory",
            ));
        }
        let full_path = build_full_path(remote_path, cfg);

        let result = self.run("delete file", cfg, &format!("del \"{}\"", full_path))?;
        if let Some(err) = result.error {
            return Err(match classify_output(&result.output) {
                Some(ErrorKind::NotFound) => {
                    SmbError::not_found(format!("file not found: {}", full_path))
                }
                Some(ErrorKind::AccessDenied) => {
                    SmbError::access_denied(format!("access denied: cannot delete {}", full_path))
                }
                Some(ErrorKind::IsADirectory) => SmbError::is_a_directory(format!(
                    "cannot delete directory: {} (use rmdir for directories)",
                    full_path
                )),
                _ => SmbError::generic(format!("failed to delete file: {}", err)),
            });
        }

        Ok(())
    }

    /// Probe the server, share and configured base path.
    ///
    /// A reachable share with an inaccessible base path reports the connection
    /// as ok but the share as not accessible, with a distinct message.
    pub fn check_health(&self, cfg: &SmbConfig) -> HealthCheckResult {
        match self.test_connection(cfg) {
            Ok(()) => {}
            Err(err) => {
                return HealthCheckResult {
                    status: STATUS_UNHEALTHY.into(),
                    app_status: STATUS_OK.into(),
                    smb_connection: STATUS_FAILED.into(),
                    server: cfg.server_display(),
                    share: cfg.share_name.clone(),
                    error: Some(err.to_string()),
                    smb_share_accessible: false,
                };
            }
        }

        if let Err(err) = self.test_base_path(cfg) {
            return HealthCheckResult {
                status: STATUS_UNHEALTHY.into(),
                app_status: STATUS_OK.into(),
                smb_connection: STATUS_OK.into(),
                server: cfg.server_display(),
                share: cfg.share_name.clone(),
                error: Some(format!("base path validation failed: {}", err)),
                smb_share_accessible: false,
            };
        }

        HealthCheckResult {
            status: STATUS_HEALTHY.into(),
            app_status: STATUS_OK.into(),
            smb_connection: STATUS_OK.into(),
            server: cfg.server_display(),
            share: cfg.share_name.clone(),
            error: None,
            smb_share_accessible: true,
        }
    }

    /// Bare share listing to verify server reachability and credentials
    fn test_connection(&self, cfg: &SmbConfig) -> Result<()> {
        let result = self.run("health check", cfg, "ls")?;
        let Some(err) = result.error else {
            return Ok(());
        };

        Err(match classify_output(&result.output) {
            Some(ErrorKind::BadShare) => {
                SmbError::bad_share(format!("share not found: {}", cfg.share_name))
            }
            Some(ErrorKind::AuthFailure) => {
                SmbError::auth_failure("authentication failed: invalid credentials")
            }
            Some(ErrorKind::AccessDenied) => {
                SmbError::access_denied(format!("access denied to share: {}", cfg.share_name))
            }
            Some(ErrorKind::InvalidParameters) => SmbError::invalid_parameters(
                "invalid authentication parameters (check username/password format and special characters)",
            ),
            Some(ErrorKind::ConnectionRefused) => SmbError::connection_refused(
                "failed to connect to SMB server: connection refused",
            ),
            _ => err,
        })
    }

    /// Validate that the configured base path exists and is enterable
    fn test_base_path(&self, cfg: &SmbConfig) -> Result<()> {
        let base = normalize_path_segment(&cfg.base_path);
        if base.is_empty() || base == "." {
            return Ok(());
        }

        // cd validates nested paths like "apps/myapp" in one round trip
        let result = self.run("base path validation", cfg, &format!("cd \"{}\"", base))?;
        let Some(err) = result.error else {
            return Ok(());
        };

        Err(match classify_output(&result.output) {
            Some(ErrorKind::NotFound) => {
                SmbError::not_found(format!("base path does not exist: {}", cfg.base_path))
            }
            Some(ErrorKind::AccessDenied) => {
                SmbError::access_denied(format!("access denied to base path: {}", cfg.base_path))
            }
            _ => SmbError::generic(format!("failed to access base path: {}", err)),
        })
    }
}
