/*!
 * smbclient invocation synthesis
 *
 * Builds the argument vector and environment overlay for one smbclient call.
 * Secrets travel through the environment overlay, never through argv, so they
 * stay out of shell history and the process list and need no escaping.
 */

use std::collections::HashMap;
use std::net::IpAddr;

use crate::config::SmbConfig;
use crate::error::{Result, SmbError};

/// Environment variable smbclient reads the password from
pub const PASSWORD_ENV: &str = "PASSWD";

/// Replacement marker for masked secrets in diagnostic output
const REDACTED: &str = "***";

/// One smbclient invocation: ordered argv plus an environment overlay.
///
/// Constructed fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

/// Build the smbclient invocation for one command string.
///
/// Fails without spawning anything when credentials are missing for the
/// configured auth mode or the mode itself is unknown.
pub fn build_invocation(cfg: &SmbConfig, command: &str) -> Result<Invocation> {
    let mut args = Vec::new();
    let mut env = HashMap::new();

    // Service address: IP wins over the name when both are present
    let server = if cfg.server_ip.is_empty() {
        &cfg.server_name
    } else {
        &cfg.server_ip
    };
    args.push(format!("//{}/{}", server, cfg.share_name));

    // Force the direct IP only for real address literals. A hostname in the
    // IP field (e.g. a DFS namespace) must keep resolving through DNS so the
    // client can chase referrals.
    if !cfg.server_ip.is_empty() && !cfg.server_name.is_empty() && is_ip_literal(&cfg.server_ip) {
        args.push("-I".to_string());
        args.push(cfg.server_ip.clone());
    }

    // DNS-only name resolution, no legacy broadcast lookups
    args.push("-R".to_string());
    args.push("host".to_string());

    if cfg.port != 445 {
        args.push("-p".to_string());
        args.push(cfg.port.to_string());
    }

    if !cfg.domain.is_empty() {
        args.push("-W".to_string());
        args.push(cfg.domain.clone());
    }

    match cfg.auth_protocol.to_lowercase().as_str() {
        "kerberos" => {
            args.push("--use-kerberos=required".to_string());
            // Username is optional; the ticket cache authenticates
            if !cfg.username.is_empty() {
                args.push("-U".to_string());
                args.push(cfg.username.clone());
            }
            // Never prompt for a password
            args.push("-N".to_string());
        }
        "ntlm" | "negotiate" | "" => {
            if cfg.username.is_empty() || cfg.password.is_empty() {
                return Err(SmbError::invalid_parameters(format!(
                    "username and password are required for {} authentication",
                    display_protocol(&cfg.auth_protocol)
                )));
            }
            args.push("-U".to_string());
            args.push(cfg.username.clone());
            // smbclient reads PASSWD when no password is given on argv.
            // Do not add -N here: it means "no password" and would suppress
            // the environment lookup.
            env.insert(PASSWORD_ENV.to_string(), cfg.password.clone());
        }
        other => {
            return Err(SmbError::invalid_parameters(format!(
                "unsupported authentication protocol: {}",
                other
            )));
        }
    }

    if !command.is_empty() {
        args.push("-c".to_string());
        args.push(command.to_string());
    }

    Ok(Invocation { args, env })
}

/// Check whether a string is a bare IPv4 or IPv6 address literal.
///
/// Hostnames, malformed octets and host:port strings all fail the parse.
pub fn is_ip_literal(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

/// Produce a masked copy of an invocation for logging.
///
/// Masks the password half of any `user%password` argument following `-U` and
/// the value of any environment key containing a case-insensitive "pass".
/// The real invocation is never modified; this copy must only be logged.
pub fn sanitize_invocation(invocation: &Invocation) -> Invocation {
    let mut args = invocation.args.clone();
    for i in 0..args.len() {
        if args[i] == "-U" && i + 1 < args.len() {
            if let Some((user, _)) = args[i + 1].split_once('%') {
                args[i + 1] = format!("{}%{}", user, REDACTED);
            }
        }
    }

    let env = invocation
        .env
        .iter()
        .map(|(k, v)| {
            if k.to_uppercase().contains("PASS") {
                (k.clone(), REDACTED.to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect();

    Invocation { args, env }
}

fn display_protocol(protocol: &str) -> &str {
    if protocol.is_empty() {
        "negotiate"
    } else {
        protocol
    }
}
