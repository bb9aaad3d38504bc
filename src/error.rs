use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use validator::Validate;

use crate::envelope::ErrorEnvelope;

/// Error taxonomy shared by all controllers. Conversion to the wire happens in
/// one place so every failure, middleware included, renders the error
/// envelope.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized access".into())
    }

    pub fn internal() -> Self {
        ApiError::Internal("Internal Server Error".into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorEnvelope::new(status.as_u16(), self.to_string()))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database failure");
        ApiError::internal()
    }
}

/// Maps a MySQL duplicate-key failure (SQLSTATE 23000) to a conflict with the
/// given message, anything else to the internal envelope.
pub fn conflict_on_duplicate(e: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return ApiError::Conflict(message.to_string());
        }
    }
    tracing::error!(error = %e, "database failure");
    ApiError::internal()
}

/// Picks the conflict message for a duplicate-key driver message, for tables
/// with several unique columns. MySQL names the violated key, e.g.
/// `Duplicate entry 'EMP-1024' for key 'users.emp_id'`.
fn duplicate_key_message<'a>(
    driver_message: &str,
    keys: &[(&str, &'a str)],
    fallback: &'a str,
) -> &'a str {
    keys.iter()
        .find(|(column, _)| driver_message.contains(column))
        .map(|(_, message)| *message)
        .unwrap_or(fallback)
}

/// [`conflict_on_duplicate`] for tables with more than one unique column: the
/// message is chosen from the column named in the driver error.
pub fn conflict_on_duplicate_key(
    e: sqlx::Error,
    keys: &[(&str, &str)],
    fallback: &str,
) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            let message = duplicate_key_message(db_err.message(), keys, fallback);
            return ApiError::Conflict(message.to_string());
        }
    }
    tracing::error!(error = %e, "database failure");
    ApiError::internal()
}

/// Runs the declared validation rules of a request DTO before any controller
/// logic, surfacing field-level messages as a 400.
pub fn check_valid<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unauthorized().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::internal().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_carries_message() {
        assert_eq!(
            ApiError::Conflict("Username already exists".into()).to_string(),
            "Username already exists"
        );
    }

    #[test]
    fn duplicate_key_message_names_the_violated_column() {
        let keys: &[(&str, &str)] = &[
            ("user_name", "Username already exists"),
            ("emp_id", "Employee ID already exists"),
            ("phone", "Phone number already exists"),
        ];

        assert_eq!(
            duplicate_key_message(
                "Duplicate entry 'jdoe' for key 'users.user_name'",
                keys,
                "User already exists",
            ),
            "Username already exists"
        );
        assert_eq!(
            duplicate_key_message(
                "Duplicate entry 'EMP-1024' for key 'users.emp_id'",
                keys,
                "User already exists",
            ),
            "Employee ID already exists"
        );
        assert_eq!(
            duplicate_key_message(
                "Duplicate entry '8801712345678' for key 'users.phone'",
                keys,
                "User already exists",
            ),
            "Phone number already exists"
        );
        // unknown key falls back to the neutral message
        assert_eq!(
            duplicate_key_message(
                "Duplicate entry 'x' for key 'users.something_else'",
                keys,
                "User already exists",
            ),
            "User already exists"
        );
    }
}
