// HTTP 命令模块
// 提供供前端调用的接口，路径与参数名与既有客户端保持一致

pub mod daily;
pub mod question;
pub mod test_paper;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppError;
use crate::services::{DatabaseService, Syllabus};

/// 应用状态：大纲只读共享，数据库连接受互斥锁保护
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseService,
    pub syllabus: Arc<Syllabus>,
}

impl AppState {
    pub fn new(db: DatabaseService, syllabus: Syllabus) -> Self {
        Self {
            db,
            syllabus: Arc::new(syllabus),
        }
    }
}

/// 从 `Authorization: <scheme> <userid>` 中取出的用户 id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl AuthUser {
    pub fn from_header(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let _scheme = parts.next()?;
        let user = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(AuthUser(user.to_string()))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(AuthUser::from_header)
            .ok_or(AppError::Unauthorized)
    }
}

/// 成功响应：`message`、`status`、`meaning` 加上接口自身字段
pub(crate) fn respond(message: &str, payload: Value) -> Json<Value> {
    let mut body = json!({
        "message": message,
        "status": 200,
        "meaning": "ok",
    });
    if let (Some(map), Value::Object(extra)) = (body.as_object_mut(), payload) {
        map.extend(extra);
    }
    Json(body)
}

async fn health() -> Json<Value> {
    respond("ok", json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// 全部路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/savequestion", post(question::save_question))
        .route("/getreviewquestions", get(question::get_review_questions))
        .route("/reportquestion", post(question::report_question))
        .route("/getqnbyid", get(question::get_question_by_id))
        .route("/testquestions/{typeoftest}", get(test_paper::test_questions))
        .route("/createdailytest", get(daily::create_daily_test))
        .route("/invalidatedailytest", get(daily::invalidate_daily_test))
        .route("/getdailytests", get(daily::get_daily_tests))
        .route("/submitdailytest", post(daily::submit_daily_test))
        .with_state(state)
}
