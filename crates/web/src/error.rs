//! Unified error handling for HTTP handlers.

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, EmailError, RecordError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Notification email could not be sent.
    #[error("Mail error: {0}")]
    Mail(#[from] EmailError),

    /// Authentication failed outside the login form.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(kind) => Self::NotFound(kind.to_string()),
            RecordError::Repository(e) => Self::Database(e),
            RecordError::Mail(e) => Self::Mail(e),
        }
    }
}

/// Ids that do not parse name no record, so they answer 404 like a missing one.
impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!(error = %err, "Unparseable record id");
        Self::NotFound("record".to_string())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session: {err}"))
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        Self::Internal(format!("template: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let server_side = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Mail(_) => true,
            Self::Auth(e) => !matches!(e, AuthError::InvalidCredentials),
            Self::NotFound(_) => false,
        };
        if server_side {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Mail(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Auth(_) => {
                "Internal server error".to_string()
            }
            Self::Mail(_) => "The record was saved but the notification email could not be sent"
                .to_string(),
            Self::NotFound(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context from a CRM user.
pub fn set_sentry_user(user_id: i32, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("deal".to_string());
        assert_eq!(err.to_string(), "Not found: deal");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound("lead".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Mail(EmailError::Unavailable("down".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_record_error_mapping() {
        assert!(matches!(
            AppError::from(RecordError::NotFound("contact")),
            AppError::NotFound(kind) if kind == "contact"
        ));
        assert!(matches!(
            AppError::from(RecordError::Mail(EmailError::Unavailable("x".to_string()))),
            AppError::Mail(_)
        ));
    }
}
