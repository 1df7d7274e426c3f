use std::error::Error;
use std::fmt;

/// Failure reported by a storage backend, either when a fetch is issued or while its
/// stream is being pulled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: Option<String>,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: Some(message.into()) }
    }

    pub fn simple(kind: StorageErrorKind) -> Self {
        Self { kind, message: None }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl Error for StorageError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    /// The backend cannot serve fetches at all.
    Unavailable,
    /// An open stream lost its connection to the backend.
    CommunicationFailure,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageErrorKind::Unavailable => f.write_str("storage unavailable"),
            StorageErrorKind::CommunicationFailure => f.write_str("communication failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StorageError::simple(StorageErrorKind::Unavailable), "storage unavailable")]
    #[case(
        StorageError::new(StorageErrorKind::CommunicationFailure, "cursor closed"),
        "communication failure: cursor closed"
    )]
    fn display_names_kind_and_message(#[case] error: StorageError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
