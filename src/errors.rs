// 错误类型
// 统一的 JSON 错误响应：{ success: false, error: <code>, message }

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorBody;
use crate::services::DatabaseError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request() -> Self {
        Self::BadRequest("Bad request".to_string())
    }

    pub fn not_found() -> Self {
        Self::NotFound("Resources not found".to_string())
    }

    pub fn method_not_allowed() -> Self {
        Self::MethodNotAllowed("Method not allowed".to_string())
    }

    pub fn unprocessable() -> Self {
        Self::Unprocessable("Unprocessable".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 持久化失败统一报告为 422，细节只写日志
    pub fn from_persistence(operation: &str, err: DatabaseError) -> Self {
        log::error!("{} failed: {}", operation, err);
        Self::unprocessable()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        log::error!("Database error: {}", err);
        Self::Internal("Internal server error".to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log::warn!("Rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::JsonDataError(err) => Self::Unprocessable(err.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        log::warn!("Rejected query string: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

/// 路径参数不是整数时按不存在的资源处理
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        log::warn!("Rejected path parameter: {}", rejection.body_text());
        Self::not_found()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            log::warn!("{} {}", status.as_u16(), self);
        }

        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
