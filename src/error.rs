/*!
 * Domain error type for SMB relay operations
 */

use thiserror::Error;

/// Result type alias for SMB operations
pub type Result<T> = std::result::Result<T, SmbError>;

/// Stable failure category, independent of smbclient's output wording.
///
/// Callers above the operations layer (HTTP handlers, CLI) map these to their
/// own status codes and must never inspect vendor status tokens themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote file or path does not exist
    NotFound,
    /// Permission denied on the share or path
    AccessDenied,
    /// Target already exists (e.g. upload without overwrite)
    AlreadyExists,
    /// Operation targeted a directory where a file was expected
    IsADirectory,
    /// Share name does not exist on the server
    BadShare,
    /// Credentials were rejected
    AuthFailure,
    /// Bad caller input or configuration (missing credentials, bad auth mode,
    /// invalid remote path)
    InvalidParameters,
    /// Server reachable but refusing connections, or not reachable at all
    ConnectionRefused,
    /// Unclassified failure, message carries the underlying context
    Generic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::AccessDenied => "access-denied",
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::IsADirectory => "is-a-directory",
            ErrorKind::BadShare => "bad-share",
            ErrorKind::AuthFailure => "auth-failure",
            ErrorKind::InvalidParameters => "invalid-parameters",
            ErrorKind::ConnectionRefused => "connection-refused",
            ErrorKind::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Classified failure produced by the operations layer.
///
/// The message is human-readable and includes the logical path or target where
/// applicable; it never contains credentials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SmbError {
    kind: ErrorKind,
    message: String,
}

impl SmbError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn is_a_directory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IsADirectory, message)
    }

    pub fn bad_share(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadShare, message)
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailure, message)
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameters, message)
    }

    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionRefused, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    /// Stable category of this failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Check if this error is an authentication or permission issue
    pub fn is_permission_error(&self) -> bool {
        matches!(self.kind, ErrorKind::AccessDenied | ErrorKind::AuthFailure)
    }
}
