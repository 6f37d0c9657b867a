/*!
 * SMB connection configuration
 *
 * A plain value object owned by the caller and passed by reference into every
 * operation. Loading from the environment lives here too; the operations layer
 * itself never reads the environment.
 */

use std::env;

/// Default SMB port
pub const DEFAULT_PORT: u16 = 445;
/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default first-retry delay in seconds
pub const DEFAULT_INITIAL_RETRY_DELAY: f64 = 1.0;
/// Default backoff cap in seconds
pub const DEFAULT_MAX_RETRY_DELAY: f64 = 30.0;
/// Default backoff multiplier
pub const DEFAULT_RETRY_BACKOFF: f64 = 2.0;

/// SMB server, share, credential and retry configuration.
///
/// Immutable for the duration of one operation. `auth_protocol` is one of
/// `negotiate`, `ntlm` or `kerberos` (case-insensitive); validation happens at
/// command-synthesis time so a bad value fails before any subprocess runs.
#[derive(Debug, Clone)]
pub struct SmbConfig {
    pub server_name: String,
    pub server_ip: String,
    pub share_name: String,
    /// Optional prefix joined onto every caller-supplied relative path
    pub base_path: String,
    pub username: String,
    pub password: String,
    pub domain: String,
    pub auth_protocol: String,
    pub port: u16,
    pub max_retries: u32,
    /// Seconds before the first retry
    pub initial_retry_delay: f64,
    /// Cap on the computed backoff, in seconds
    pub max_retry_delay: f64,
    /// Exponential backoff multiplier
    pub retry_backoff: f64,
    /// Log sanitized smbclient invocations and output
    pub log_commands: bool,
}

impl Default for SmbConfig {
    fn default() -> Self {
        Self {
            server_name: String::new(),
            server_ip: String::new(),
            share_name: String::new(),
            base_path: String::new(),
            username: String::new(),
            password: String::new(),
            domain: String::new(),
            auth_protocol: String::new(),
            port: DEFAULT_PORT,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_retry_delay: DEFAULT_INITIAL_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            log_commands: false,
        }
    }
}

impl SmbConfig {
    /// Load configuration from `SMB_*` environment variables.
    ///
    /// Missing or malformed tunables fall back to their defaults
    /// independently; use [`SmbConfig::missing_required`] to report absent
    /// mandatory variables.
    pub fn from_env() -> Self {
        Self {
            server_name: env_string("SMB_SERVER_NAME"),
            server_ip: env_string("SMB_SERVER_IP"),
            share_name: env_string("SMB_SHARE_NAME"),
            base_path: env_string("SMB_BASE_PATH"),
            username: env_string("SMB_USERNAME"),
            password: env_string("SMB_PASSWORD"),
            domain: env_string("SMB_DOMAIN"),
            auth_protocol: env_string("SMB_AUTH_PROTOCOL").to_lowercase(),
            port: parse_port(env::var("SMB_PORT").ok()),
            max_retries: parse_retries(env::var("SMB_MAX_RETRIES").ok()),
            initial_retry_delay: parse_delay(
                env::var("SMB_RETRY_INITIAL_DELAY").ok(),
                DEFAULT_INITIAL_RETRY_DELAY,
            ),
            max_retry_delay: parse_delay(
                env::var("SMB_RETRY_MAX_DELAY").ok(),
                DEFAULT_MAX_RETRY_DELAY,
            ),
            retry_backoff: parse_delay(env::var("SMB_RETRY_BACKOFF").ok(), DEFAULT_RETRY_BACKOFF),
            log_commands: parse_bool(env::var("SMB_LOG_COMMANDS").ok()),
        }
    }

    /// Names of required environment variables that are not set.
    ///
    /// Username and password are only mandatory for non-Kerberos auth; a
    /// Kerberos deployment authenticates from the system ticket cache.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.server_name.is_empty() && self.server_ip.is_empty() {
            missing.push("SMB_SERVER_NAME");
        }
        if self.share_name.is_empty() {
            missing.push("SMB_SHARE_NAME");
        }
        if !self.auth_protocol.eq_ignore_ascii_case("kerberos") {
            if self.username.is_empty() {
                missing.push("SMB_USERNAME");
            }
            if self.password.is_empty() {
                missing.push("SMB_PASSWORD");
            }
        }
        missing
    }

    /// Display string for diagnostics and health output: `name (ip:port)`
    pub fn server_display(&self) -> String {
        format!("{} ({}:{})", self.server_name, self.server_ip, self.port)
    }
}

fn env_string(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn parse_port(value: Option<String>) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|&p| p != 0)
        .unwrap_or(DEFAULT_PORT)
}

fn parse_retries(value: Option<String>) -> u32 {
    // Negative or non-numeric values fall back; 0 is valid (single attempt)
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|&n| (0..=i64::from(u32::MAX)).contains(&n))
        .map(|n| n as u32)
        .unwrap_or(DEFAULT_MAX_RETRIES)
}

fn parse_delay(value: Option<String>, default: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(default)
}

fn parse_bool(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SmbConfig::default();
        assert_eq!(cfg.port, 445);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.initial_retry_delay, 1.0);
        assert_eq!(cfg.max_retry_delay, 30.0);
        assert_eq!(cfg.retry_backoff, 2.0);
        assert!(!cfg.log_commands);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(None), 445);
        assert_eq!(parse_port(Some("139".into())), 139);
        assert_eq!(parse_port(Some("not-a-port".into())), 445);
        assert_eq!(parse_port(Some("0".into())), 445);
    }

    #[test]
    fn test_parse_retries_independent_fallback() {
        assert_eq!(parse_retries(None), DEFAULT_MAX_RETRIES);
        assert_eq!(parse_retries(Some("5".into())), 5);
        assert_eq!(parse_retries(Some("0".into())), 0);
        assert_eq!(parse_retries(Some("-5".into())), DEFAULT_MAX_RETRIES);
        assert_eq!(parse_retries(Some("invalid".into())), DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_parse_delay_independent_fallback() {
        assert_eq!(parse_delay(Some("0.5".into()), 1.0), 0.5);
        assert_eq!(parse_delay(None, 1.0), 1.0);
        assert_eq!(parse_delay(Some("-1.0".into()), 1.0), 1.0);
        assert_eq!(parse_delay(Some("0".into()), 1.0), 1.0);
        assert_eq!(parse_delay(Some("invalid".into()), 30.0), 30.0);
        assert_eq!(parse_delay(Some("nan".into()), 30.0), 30.0);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true".into())));
        assert!(parse_bool(Some("1".into())));
        assert!(parse_bool(Some("YES".into())));
        assert!(!parse_bool(Some("false".into())));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_missing_required_ntlm() {
        let cfg = SmbConfig {
            server_name: "fileserver".into(),
            share_name: "docs".into(),
            auth_protocol: "ntlm".into(),
            ..SmbConfig::default()
        };
        let missing = cfg.missing_required();
        assert_eq!(missing, vec!["SMB_USERNAME", "SMB_PASSWORD"]);
    }

    #[test]
    fn test_missing_required_kerberos_skips_credentials() {
        let cfg = SmbConfig {
            server_name: "fileserver".into(),
            share_name: "docs".into(),
            auth_protocol: "kerberos".into(),
            ..SmbConfig::default()
        };
        assert!(cfg.missing_required().is_empty());
    }

    #[test]
    fn test_server_display() {
        let cfg = SmbConfig {
            server_name: "fileserver".into(),
            server_ip: "192.168.1.10".into(),
            ..SmbConfig::default()
        };
        assert_eq!(cfg.server_display(), "fileserver (192.168.1.10:445)");
    }
}
