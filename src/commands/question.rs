// 题目相关接口：保存/审核、待审核队列、举报、按 id 查询

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{respond, AppState, AuthUser};
use crate::error::AppError;
use crate::models::ReviewQueue;
use crate::services::moderation::{self, QuestionElement};

#[derive(Debug, Deserialize)]
pub struct SaveQuestionBody {
    #[serde(rename = "questionElement")]
    pub question_element: QuestionElement,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub n: Option<String>,
    pub t: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub questionid: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub i: Option<String>,
}

/// POST /savequestion
pub async fn save_question(
    State(state): State<AppState>,
    body: Result<Json<SaveQuestionBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let saved = moderation::save_question(&state.db, &state.syllabus, body.question_element)?;

    let q = &saved.question;
    Ok(respond(
        saved.message,
        json!({
            "elem": {
                "_id": q.id,
                "isaddedby": q.isadded.by,
                "isverified": q.isverified.by,
                "isreportedby": q.isreported.by,
            }
        }),
    ))
}

/// GET /getreviewquestions?n=&t=
pub async fn get_review_questions(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Value>, AppError> {
    let queue = ReviewQueue::from_param(query.t.as_deref());
    let questions = {
        let mut rng = rand::thread_rng();
        moderation::review_questions(&state.db, query.n.as_deref(), queue, &mut rng)?
    };
    Ok(respond(
        "Review questions fetched successfully",
        json!({ "questions": questions }),
    ))
}

/// POST /reportquestion
pub async fn report_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ReportBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let question = moderation::report_question(&state.db, &body.questionid, &body.message, &user_id)?;
    Ok(respond(
        "Question reported successfully",
        json!({
            "report": question.isreported,
            "questionid": question.id,
        }),
    ))
}

/// GET /getqnbyid?i=
pub async fn get_question_by_id(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let question = moderation::get_question(&state.db, query.i.as_deref())?;
    Ok(respond(
        "Question fetched successfully",
        json!({ "question": question }),
    ))
}
