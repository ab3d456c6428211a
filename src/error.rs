//! Error types for satpos.
//!
//! "No matching record" is never an error: queries return `None` or an empty
//! vector for that. Errors are reserved for an unusable store, malformed
//! caller input, and I/O or decoding failures.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SatposError>;

#[derive(Debug, Error)]
pub enum SatposError {
    /// The backing store cannot be reached or its table does not exist.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller input rejected before reaching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid timestamp '{input}': expected ISO-8601 without offset (e.g. 2021-01-26T05:00:00)")]
    InvalidTimestamp { input: String },

    #[error("invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("scan cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "snapshot")]
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SatposError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("no such table") => {
                SatposError::StoreUnavailable(msg.clone())
            }
            rusqlite::Error::SqliteFailure(code, _)
                if matches!(
                    code.code,
                    rusqlite::ErrorCode::CannotOpen
                        | rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                        | rusqlite::ErrorCode::NotADatabase
                ) =>
            {
                SatposError::StoreUnavailable(err.to_string())
            }
            other => SatposError::Sqlite(other),
        }
    }
}

impl SatposError {
    /// Whether the error means the store itself is unusable, as opposed to
    /// a problem with the request.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, SatposError::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_message_names_input() {
        let err = SatposError::InvalidTimestamp {
            input: "yesterday".into(),
        };
        assert!(err.to_string().contains("'yesterday'"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SatposError = io.into();
        assert!(matches!(err, SatposError::Io(_)));
        assert!(!err.is_store_unavailable());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_missing_table_maps_to_unavailable() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: SatposError = conn
            .query_row("SELECT COUNT(*) FROM nowhere", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();
        assert!(err.is_store_unavailable());
    }
}
