use thiserror::Error;

use shared_models::error::ScheduleError;

/// Postgres SQLSTATE for "invalid input syntax", echoed in PostgREST error bodies.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The database (or the PostgREST gateway in front of it) could not be reached.
    #[error("Database unreachable: {0}")]
    Unreachable(String),

    /// A unique or exclusion constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A filter value the column type cannot hold, e.g. a non-uuid id (22P02).
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl DatabaseError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            409 => DatabaseError::Conflict(body),
            400 if body.contains(INVALID_TEXT_REPRESENTATION) => DatabaseError::InvalidIdentifier(body),
            401 | 403 => DatabaseError::Auth(body),
            404 => DatabaseError::NotFound(body),
            502..=504 => DatabaseError::Unreachable(body),
            _ => DatabaseError::Api { status, message: body },
        }
    }
}

impl From<reqwest::Error> for DatabaseError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            DatabaseError::Unreachable(error.to_string())
        } else if error.is_decode() {
            DatabaseError::Decode(error.to_string())
        } else {
            DatabaseError::Request(error.to_string())
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::Decode(error.to_string())
    }
}

impl From<DatabaseError> for ScheduleError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Unreachable(msg) => ScheduleError::Unavailable(msg),
            DatabaseError::Conflict(_) => ScheduleError::Conflict("Schedule conflict".to_string()),
            DatabaseError::InvalidIdentifier(_) | DatabaseError::NotFound(_) => {
                ScheduleError::NotFound("Record".to_string())
            }
            other => ScheduleError::Internal(other.to_string()),
        }
    }
}
