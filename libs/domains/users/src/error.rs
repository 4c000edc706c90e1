use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use validator::ValidationErrors;

/// Server error code raised by a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid user ID format")]
    InvalidId,

    #[error("Name and email are required")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(String),

    /// Storage failure tagged with the message for the operation that hit it
    #[error("{message}: {detail}")]
    Storage { message: &'static str, detail: String },
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidId => AppError::InvalidId(err.to_string()),
            UserError::MissingFields | UserError::InvalidEmail => {
                AppError::Validation(err.to_string())
            }
            UserError::Validation(msg) => AppError::Validation(msg),
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::DuplicateEmail => AppError::Conflict(err.to_string()),
            UserError::Database(detail) => AppError::Database {
                message: ErrorCode::DatabaseError.default_message().to_string(),
                detail,
            },
            UserError::Storage { message, detail } => AppError::Database {
                message: message.to_string(),
                detail,
            },
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return UserError::DuplicateEmail;
        }
        UserError::Database(err.to_string())
    }
}

/// Collapse field-level validation failures into the error the client sees.
///
/// A missing or empty required field wins over a malformed email.
impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors.field_errors();

        let missing = fields
            .values()
            .flat_map(|errs| errs.iter())
            .any(|e| e.code == "required");
        if missing {
            return UserError::MissingFields;
        }

        if fields.contains_key("email") {
            return UserError::InvalidEmail;
        }

        let message = fields
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        UserError::Validation(message)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::InvalidId, StatusCode::BAD_REQUEST),
            (UserError::MissingFields, StatusCode::BAD_REQUEST),
            (UserError::InvalidEmail, StatusCode::BAD_REQUEST),
            (UserError::Validation("Name cannot be empty".into()), StatusCode::BAD_REQUEST),
            (UserError::NotFound, StatusCode::NOT_FOUND),
            (UserError::DuplicateEmail, StatusCode::CONFLICT),
            (UserError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                UserError::Storage {
                    message: "Failed to fetch users",
                    detail: "boom".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(UserError::InvalidId.to_string(), "Invalid user ID format");
        assert_eq!(UserError::MissingFields.to_string(), "Name and email are required");
        assert_eq!(UserError::InvalidEmail.to_string(), "Invalid email format");
        assert_eq!(UserError::NotFound.to_string(), "User not found");
        assert_eq!(UserError::DuplicateEmail.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_storage_error_body_names_the_operation() {
        let response = UserError::Storage {
            message: "Failed to delete user",
            detail: "connection reset by peer".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Failed to delete user" }));
    }

    #[test]
    fn test_non_duplicate_driver_error_is_database() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "socket closed");
        let err = mongodb::error::Error::from(io);
        assert!(matches!(UserError::from(err), UserError::Database(_)));
    }
}
