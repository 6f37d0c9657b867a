/*!
 * Retry with exponential backoff for transient SMB failures
 *
 * smbclient reports failures as free text, so retryability is decided by
 * scanning the error and captured output for known transient markers. Unknown
 * errors fail fast rather than retry blindly.
 */

use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::config::SmbConfig;
use crate::executor::ExecutionResult;

/// Markers of transient network-class failures worth retrying
const RETRYABLE_PATTERNS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection timed out",
    "timeout",
    "i/o timeout",
    "network is unreachable",
    "no route to host",
    "broken pipe",
    "nt_status_io_timeout",
    "nt_status_connection_refused",
    "nt_status_network_unreachable",
    "nt_status_host_unreachable",
    "nt_status_connection_reset",
    "nt_status_pipe_broken",
    "nt_status_pipe_disconnected",
    "temporary failure",
];

/// Markers of permanent failures that must surface immediately
const NON_RETRYABLE_PATTERNS: &[&str] = &[
    "nt_status_logon_failure",
    "nt_status_access_denied",
    "nt_status_bad_network_name",
    "nt_status_object_name_not_found",
    "nt_status_object_path_not_found",
    "nt_status_object_name_collision",
    "nt_status_file_is_a_directory",
    "authentication failed",
    "invalid credentials",
    "access denied",
    "not found",
    "invalid parameter",
];

/// Decide whether a failed attempt is worth retrying.
///
/// Both the error text and the captured output are scanned, lower-cased.
/// Unknown failures are not retried.
pub fn is_retryable(result: &ExecutionResult) -> bool {
    let Some(err) = &result.error else {
        return false;
    };

    let error_text = err.to_string().to_lowercase();
    let output_text = result.output.to_lowercase();

    if RETRYABLE_PATTERNS
        .iter()
        .any(|p| error_text.contains(p) || output_text.contains(p))
    {
        return true;
    }

    if NON_RETRYABLE_PATTERNS
        .iter()
        .any(|p| error_text.contains(p) || output_text.contains(p))
    {
        return false;
    }

    false
}

/// Delay before the retry following a given zero-based attempt index:
/// `initial * backoff^attempt`, capped at the configured maximum.
pub fn calculate_backoff(attempt: u32, cfg: &SmbConfig) -> Duration {
    let delay = cfg.initial_retry_delay * cfg.retry_backoff.powi(attempt as i32);
    let capped = delay.min(cfg.max_retry_delay);
    Duration::from_secs_f64(capped.max(0.0))
}

/// Run one attempt function up to `max_retries + 1` times.
///
/// Returns on the first success or the first non-retryable failure; otherwise
/// sleeps the backoff between attempts and returns the last attempt's result
/// once retries are exhausted. The sleep blocks the calling thread; bounded
/// latency is the caller's concern.
pub fn execute_with_retry<F>(operation: &str, cfg: &SmbConfig, mut attempt_fn: F) -> ExecutionResult
where
    F: FnMut() -> ExecutionResult,
{
    let max_attempts = cfg.max_retries + 1;
    let mut last = ExecutionResult::default();

    for attempt in 0..max_attempts {
        let result = attempt_fn();

        if result.is_ok() {
            if attempt > 0 {
                info!("{} succeeded after {} retries", operation, attempt);
            }
            return result;
        }

        last = result;

        if attempt == max_attempts - 1 {
            if attempt > 0 {
                if let Some(err) = &last.error {
                    error!("{} failed after {} retries: {}", operation, attempt, err);
                }
            }
            break;
        }

        if !is_retryable(&last) {
            if attempt > 0 {
                if let Some(err) = &last.error {
                    info!(
                        "{} failed with non-retryable error after {} attempts: {}",
                        operation,
                        attempt + 1,
                        err
                    );
                }
            }
            break;
        }

        let delay = calculate_backoff(attempt, cfg);
        if let Some(err) = &last.error {
            info!(
                "{} failed (attempt {}/{}), retrying in {:?}: {}",
                operation,
                attempt + 1,
                max_attempts,
                delay,
                err
            );
        }
        thread::sleep(delay);
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmbError;

    fn retry_config(max_retries: u32) -> SmbConfig {
        SmbConfig {
            max_retries,
            initial_retry_delay: 0.001,
            max_retry_delay: 0.002,
            retry_backoff: 2.0,
            ..SmbConfig::default()
        }
    }

    fn transient_failure() -> ExecutionResult {
        ExecutionResult::failed(
            "do_connect: Connection to server failed (Error NT_STATUS_IO_TIMEOUT)",
            SmbError::generic("smbclient command failed: exit status: 1"),
        )
    }

    fn permanent_failure() -> ExecutionResult {
        ExecutionResult::failed(
            "session setup failed: NT_STATUS_LOGON_FAILURE",
            SmbError::generic("smbclient command failed: exit status: 1"),
        )
    }

    #[test]
    fn test_retryable_markers() {
        assert!(is_retryable(&transient_failure()));
        assert!(is_retryable(&ExecutionResult::failed(
            "",
            SmbError::generic("connect failed: Connection refused"),
        )));
        assert!(is_retryable(&ExecutionResult::failed(
            "write error: Broken pipe",
            SmbError::generic("smbclient command failed"),
        )));
    }

    #[test]
    fn test_non_retryable_markers() {
        assert!(!is_retryable(&permanent_failure()));
        assert!(!is_retryable(&ExecutionResult::failed(
            "NT_STATUS_ACCESS_DENIED listing \\*",
            SmbError::generic("smbclient command failed"),
        )));
        assert!(!is_retryable(&ExecutionResult::failed(
            "NT_STATUS_OBJECT_NAME_NOT_FOUND",
            SmbError::generic("smbclient command failed"),
        )));
    }

    #[test]
    fn test_unknown_error_not_retried() {
        let result = ExecutionResult::failed("", SmbError::generic("something odd happened"));
        assert!(!is_retryable(&result));
    }

    #[test]
    fn test_success_never_retryable() {
        assert!(!is_retryable(&ExecutionResult::ok("fine")));
    }

    #[test]
    fn test_backoff_progression() {
        let cfg = SmbConfig {
            initial_retry_delay: 1.0,
            retry_backoff: 2.0,
            max_retry_delay: 100.0,
            ..SmbConfig::default()
        };
        assert_eq!(calculate_backoff(0, &cfg), Duration::from_secs(1));
        assert_eq!(calculate_backoff(1, &cfg), Duration::from_secs(2));
        assert_eq!(calculate_backoff(2, &cfg), Duration::from_secs(4));
        assert_eq!(calculate_backoff(3, &cfg), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_capped_at_max_delay() {
        let cfg = SmbConfig {
            initial_retry_delay: 1.0,
            retry_backoff: 2.0,
            max_retry_delay: 5.0,
            ..SmbConfig::default()
        };
        assert_eq!(calculate_backoff(10, &cfg), Duration::from_secs(5));
    }

    #[test]
    fn test_retryable_error_exhausts_all_attempts() {
        let mut calls = 0;
        let result = execute_with_retry("test operation", &retry_config(2), || {
            calls += 1;
            transient_failure()
        });
        assert_eq!(calls, 3);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let mut calls = 0;
        execute_with_retry("test operation", &retry_config(0), || {
            calls += 1;
            transient_failure()
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_non_retryable_error_fails_immediately() {
        let mut calls = 0;
        let result = execute_with_retry("test operation", &retry_config(5), || {
            calls += 1;
            permanent_failure()
        });
        assert_eq!(calls, 1);
        assert!(result.output.contains("NT_STATUS_LOGON_FAILURE"));
    }

    #[test]
    fn test_success_short_circuits() {
        let mut calls = 0;
        let result = execute_with_retry("test operation", &retry_config(5), || {
            calls += 1;
            ExecutionResult::ok("listing output")
        });
        assert_eq!(calls, 1);
        assert_eq!(result.output, "listing output");
    }

    #[test]
    fn test_recovery_after_transient_failure() {
        let mut calls = 0;
        let result = execute_with_retry("test operation", &retry_config(3), || {
            calls += 1;
            if calls < 3 {
                transient_failure()
            } else {
                ExecutionResult::ok("recovered")
            }
        });
        assert_eq!(calls, 3);
        assert!(result.is_ok());
        assert_eq!(result.output, "recovered");
    }

    #[test]
    fn test_last_attempt_result_returned_on_exhaustion() {
        let mut calls = 0;
        let result = execute_with_retry("test operation", &retry_config(1), || {
            calls += 1;
            ExecutionResult::failed(
                format!("attempt {} timed out", calls),
                SmbError::generic("connection timed out"),
            )
        });
        assert_eq!(calls, 2);
        assert_eq!(result.output, "attempt 2 timed out");
    }
}
