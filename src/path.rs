/*!
 * Remote path normalization and base-path scoping
 *
 * smbclient is tolerant of forward slashes but not of doubled separators or
 * mixed slash direction, so every caller-supplied path is canonicalized here
 * before it reaches command synthesis.
 */

use crate::config::SmbConfig;

/// Canonicalize one path segment: strip leading/trailing separators, convert
/// backslashes to forward slashes, collapse repeated slashes.
///
/// `.` maps to `.` and the empty string maps to the empty string.
pub fn normalize_path_segment(path: &str) -> String {
    let forward = path.replace('\\', "/");
    forward
        .split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join two normalized SMB path segments with a single `/`.
///
/// An empty or `.` segment is an identity element on either side.
pub fn join_smb_paths(base: &str, relative: &str) -> String {
    let base = normalize_path_segment(base);
    let relative = normalize_path_segment(relative);

    if base.is_empty() || base == "." {
        return relative;
    }
    if relative.is_empty() || relative == "." {
        return base;
    }
    format!("{}/{}", base, relative)
}

/// Resolve a caller-supplied relative path against the configured base path.
///
/// Every remote-path-accepting operation routes through this, so a configured
/// base path transparently scopes the whole share for its tenant.
pub fn build_full_path(relative: &str, cfg: &SmbConfig) -> String {
    join_smb_paths(&cfg.base_path, relative)
}
