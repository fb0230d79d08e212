//! Unified error types for chorus.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A stored entry is internally inconsistent. This means the store
    /// itself is corrupt; substituting defaults would hide that.
    #[error("corrupt cache entry for {request}: {detail}")]
    CorruptEntry { request: String, detail: String },

    /// A stored body could not be decoded per its format tag.
    #[error("cannot decode cached body: {0}")]
    Decode(String),

    /// A fetch result could not be encoded for storage.
    #[error("cannot encode fetch result: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Transport failure surfaced by the underlying fetch.
    #[error("http error: {0}")]
    Http(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_entry_display() {
        let err = Error::CorruptEntry {
            request: "https://example.com/a".to_string(),
            detail: "header blob".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/a"));
        assert!(err.to_string().contains("header blob"));
    }

    #[test]
    fn test_decode_display() {
        let err = Error::Decode("expected value at line 1".to_string());
        assert!(err.to_string().contains("cannot decode"));
    }
}
