// 错误类型
// 服务层使用 anyhow，接口层统一转换为 AppError 并输出 JSON

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid or missing {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or malformed authorization header")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidParameter { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 响应体中的 `meaning` 字段
pub fn meaning(status: StatusCode) -> &'static str {
    match status {
        StatusCode::OK => "ok",
        StatusCode::BAD_REQUEST => "badrequest",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::NOT_FOUND => "notfound",
        StatusCode::CONFLICT => "conflict",
        _ => "internalerror",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "message": self.to_string(),
            "status": status.as_u16(),
            "meaning": meaning(status),
        });
        match &self {
            AppError::InvalidParameter { field, .. } => {
                body["field"] = json!(field);
            }
            AppError::Internal(e) => {
                log::error!("request failed: {:#}", e);
                body["message"] = json!("Internal server error");
                body["error"] = json!(format!("{:#}", e));
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}
