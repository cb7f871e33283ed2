use axum::http::StatusCode;
use thiserror::Error;

/// Credential and session failures, surfaced with a user-readable message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("email address is not valid")]
    MalformedEmail,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("not signed in")]
    NotSignedIn,
    #[error("password hashing failed")]
    Hash,
}

/// Persistence failures. The triggering operation is treated as not
/// applied: in-memory state is only swapped after the snapshot write.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write data file: {0}")]
    Io(#[from] std::io::Error),
}

/// A required field is missing. Blocks onboarding advancement and is never
/// sent to storage.
#[derive(Debug, Error)]
#[error("missing required field: {field}")]
pub struct ValidationError {
    pub field: &'static str,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::InvalidCredentials | AuthError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::MalformedEmail | AuthError::WeakPassword => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AuthError::Hash => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::internal(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
