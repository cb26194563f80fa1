use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 接口层错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) | AppError::Token(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Database(_) | AppError::Password(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::BadRequest(_) => error_codes::VALIDATION_ERROR,
            AppError::Forbidden(_) => error_codes::PERMISSION_DENIED,
            AppError::Conflict(_) => error_codes::USER_EXISTS,
            AppError::Unauthorized(_) | AppError::Token(_) => error_codes::AUTH_FAILED,
            AppError::Internal(_) | AppError::Database(_) | AppError::Password(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match &self {
            // 不向客户端暴露内部细节
            AppError::Database(_) | AppError::Password(_) | AppError::Internal(_) => {
                tracing::error!("Request failed: {}", self);
                "内部服务器错误".to_string()
            }
            AppError::Token(_) => "Could not validate credentials".to_string(),
            other => other.to_string(),
        };

        (status, error_to_api_response::<()>(self.code(), msg)).into_response()
    }
}
