use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::models::dto::response::ApiResponse;

pub const SERVER_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Attempts exhausted: {0}")]
    AttemptsExhausted(String),

    #[error("No more questions: {0}")]
    NoMoreQuestions(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AttemptsExhausted(_) => "ATTEMPTS_EXHAUSTED",
            AppError::NoMoreQuestions(_) => "NO_MORE_QUESTIONS",
            AppError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to hand to a client. Server-side failures collapse to a
    /// generic string; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                SERVER_ERROR_MESSAGE.to_string()
            }
            AppError::NotFound(msg)
            | AppError::QuestionNotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::ValidationError(msg)
            | AppError::AttemptsExhausted(msg)
            | AppError::NoMoreQuestions(msg)
            | AppError::ConcurrentModification(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::QuestionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::ConcurrentModification(_) => {
                StatusCode::CONFLICT
            }
            AppError::ValidationError(_) | AppError::NoMoreQuestions(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::AttemptsExhausted(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed with {}: {}", status.as_u16(), self);
        }
        HttpResponse::build(status).json(ApiResponse::empty(status.as_u16(), self.public_message()))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}
impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::InternalError(format!("BSON deserialization error: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<async_graphql::Error> for AppError {
    fn from(err: async_graphql::Error) -> Self {
        AppError::InternalError(err.message)
    }
}
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.public_message()).extend_with(|_err, e| {
            e.set("code", self.error_code());
            e.set("statusCode", self.status_code().as_u16() as i32);
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
