//! Unified error type for all store and service operations.

use thiserror::Error;

/// Things that can go wrong when using the store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No live user has this id.
    #[error("user not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },
    /// Another live user already owns this email.
    #[error("user with email {email} already exists")]
    AlreadyExists {
        /// The conflicting email.
        email: String,
    },
    /// Create was handed an id that is already live.
    #[error("user id {id} is already taken")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },
    /// Reading, writing or parsing the snapshot failed.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// Input or configuration did not pass validation.
    #[error("invalid input: {0}")]
    Invalid(String),
    /// Registering or encoding metrics failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

impl Error {
    /// Transport-level status code a caller should surface for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::AlreadyExists { .. } | Error::DuplicateId { .. } => 409,
            Error::Invalid(_) => 400,
            Error::Persistence(_) | Error::Telemetry(_) => 500,
        }
    }

    /// `true` for errors caused by the caller rather than by the store.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_io() {
            "i/o"
        } else if err.is_syntax() || err.is_eof() {
            "malformed snapshot"
        } else {
            "snapshot shape"
        };
        Error::Persistence(format!("{kind}: {err}"))
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Telemetry(err.to_string())
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
