/*!
 * Interpretation of smbclient's text output
 *
 * Two concerns live here: parsing directory listings into typed entries, and
 * mapping the vendor status tokens buried in free text onto stable error
 * categories. Both token tables are deliberately local to this module so they
 * can grow without touching call sites.
 */

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::ErrorKind;

/// One row of a directory listing, in the client's own output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    pub size: u64,
    pub is_dir: bool,
}

/// Listing line shape:
/// `  filename                        A     1024  Mon Jan  1 12:34:56 2024`
///
/// Names may contain spaces, so the pattern anchors on the trailing
/// attributes/size/timestamp columns instead of splitting on whitespace.
fn listing_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s+(.+?)\s+([A-Za-z]+)\s+(\d+)\s+(.*)$").expect("valid regex"))
}

/// Parse smbclient `ls` output into file entries.
///
/// Banner, footer and blank lines are skipped silently, as are the `.` and
/// `..` entries. A size that fails to parse yields 0 rather than dropping the
/// entry or failing the listing.
pub fn parse_listing(output: &str) -> Vec<FileEntry> {
    let regex = listing_line_regex();
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        // Trailing summary, e.g. "  4190208 blocks of size 1024. 2 blocks available"
        if line.contains("blocks of size") || line.contains("blocks available") {
            continue;
        }

        let Some(captures) = regex.captures(line) else {
            continue;
        };

        let name = captures[1].trim().to_string();
        if name == "." || name == ".." {
            continue;
        }

        let attributes = &captures[2];
        let size = captures[3].parse::<u64>().unwrap_or(0);
        let timestamp = captures[4].trim().to_string();

        entries.push(FileEntry {
            name,
            timestamp,
            size,
            is_dir: attributes.contains('D'),
        });
    }

    entries
}

/// Map vendor status tokens in output text to a stable error category.
///
/// Returns `None` when no known token is present; callers fall back to a
/// generic wrap of the underlying execution error.
pub fn classify_output(output: &str) -> Option<ErrorKind> {
    if output.contains("NT_STATUS_OBJECT_NAME_NOT_FOUND")
        || output.contains("NT_STATUS_OBJECT_PATH_NOT_FOUND")
    {
        return Some(ErrorKind::NotFound);
    }
    if output.contains("NT_STATUS_ACCESS_DENIED") {
        return Some(ErrorKind::AccessDenied);
    }
    if output.contains("NT_STATUS_BAD_NETWORK_NAME") {
        return Some(ErrorKind::BadShare);
    }
    if output.contains("NT_STATUS_LOGON_FAILURE") {
        return Some(ErrorKind::AuthFailure);
    }
    if output.contains("NT_STATUS_INVALID_PARAMETER") {
        return Some(ErrorKind::InvalidParameters);
    }
    if output.contains("NT_STATUS_OBJECT_NAME_COLLISION") {
        return Some(ErrorKind::AlreadyExists);
    }
    if output.contains("NT_STATUS_FILE_IS_A_DIRECTORY") {
        return Some(ErrorKind::IsADirectory);
    }
    if output.contains("Connection refused") || output.contains("failed to connect") {
        return Some(ErrorKind::ConnectionRefused);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_FIXTURE: &str = "
  .                                   D        0  Mon Jan  8 10:00:00 2024
  ..                                  D        0  Mon Jan  8 10:00:00 2024
  report.pdf                          A    52428  Tue Jan  9 14:22:10 2024
  Quarterly Results 2024.xlsx         A   104857  Wed Jan 10 09:15:42 2024
  archive                             D        0  Thu Jan 11 16:45:03 2024

                4190208 blocks of size 1024. 1048576 blocks available
";

    #[test]
    fn test_parse_listing_fixture() {
        let entries = parse_listing(LISTING_FIXTURE);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "report.pdf");
        assert_eq!(entries[0].size, 52428);
        assert!(!entries[0].is_dir);
        assert_eq!(entries[0].timestamp, "Tue Jan  9 14:22:10 2024");

        assert_eq!(entries[1].name, "Quarterly Results 2024.xlsx");
        assert_eq!(entries[1].size, 104857);
        assert!(!entries[1].is_dir);

        assert_eq!(entries[2].name, "archive");
        assert_eq!(entries[2].size, 0);
        assert!(entries[2].is_dir);
    }

    #[test]
    fn test_dot_entries_excluded() {
        let entries = parse_listing(LISTING_FIXTURE);
        assert!(entries.iter().all(|e| e.name != "." && e.name != ".."));
    }

    #[test]
    fn test_banner_and_blank_lines_skipped() {
        let output = "Try \"help\" to get a list of possible commands.\n\n\
                      \t4190208 blocks of size 1024. 2 blocks available\n";
        assert!(parse_listing(output).is_empty());
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn test_hidden_and_system_attributes() {
        let output = "  pagefile.sys                      AHS   4096  Mon Jan  8 10:00:00 2024\n";
        let entries = parse_listing(output);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_dir);

        let output = "  System Volume Information          DHS      0  Mon Jan  8 10:00:00 2024\n";
        let entries = parse_listing(output);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_dir);
        assert_eq!(entries[0].name, "System Volume Information");
    }

    #[test]
    fn test_unpadded_line_not_matched() {
        // Real listing lines are left-padded; anything flush-left is banner text
        let output = "report.pdf    A    52428  Tue Jan  9 14:22:10 2024\n";
        assert!(parse_listing(output).is_empty());
    }

    #[test]
    fn test_classify_not_found_tokens() {
        assert_eq!(
            classify_output("cd \\missing\\: NT_STATUS_OBJECT_NAME_NOT_FOUND"),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            classify_output("NT_STATUS_OBJECT_PATH_NOT_FOUND listing \\a\\b"),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_classify_remaining_tokens() {
        assert_eq!(
            classify_output("NT_STATUS_ACCESS_DENIED"),
            Some(ErrorKind::AccessDenied)
        );
        assert_eq!(
            classify_output("tree connect failed: NT_STATUS_BAD_NETWORK_NAME"),
            Some(ErrorKind::BadShare)
        );
        assert_eq!(
            classify_output("session setup failed: NT_STATUS_LOGON_FAILURE"),
            Some(ErrorKind::AuthFailure)
        );
        assert_eq!(
            classify_output("NT_STATUS_INVALID_PARAMETER"),
            Some(ErrorKind::InvalidParameters)
        );
        assert_eq!(
            classify_output("NT_STATUS_OBJECT_NAME_COLLISION"),
            Some(ErrorKind::AlreadyExists)
        );
        assert_eq!(
            classify_output("NT_STATUS_FILE_IS_A_DIRECTORY"),
            Some(ErrorKind::IsADirectory)
        );
        assert_eq!(
            classify_output("do_connect: Connection to 10.0.0.1 failed to connect"),
            Some(ErrorKind::ConnectionRefused)
        );
        assert_eq!(
            classify_output("connect failed: Connection refused"),
            Some(ErrorKind::ConnectionRefused)
        );
    }

    #[test]
    fn test_classify_unknown_output() {
        assert_eq!(classify_output("something inscrutable"), None);
        assert_eq!(classify_output(""), None);
    }
}
