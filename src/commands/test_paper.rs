// 组卷接口

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{respond, AppState};
use crate::error::AppError;
use crate::services::{assemble, group_by_subject, validate, TestParams, TestRequest};
use crate::utils::today_date_id;

#[derive(Debug, Default, Deserialize)]
pub struct TestQuery {
    pub sub: Option<String>,
    pub unit: Option<String>,
    pub chap: Option<String>,
    pub num: Option<String>,
}

impl From<TestQuery> for TestParams {
    fn from(q: TestQuery) -> Self {
        TestParams {
            sub: q.sub,
            unit: q.unit,
            chap: q.chap,
            num: q.num,
        }
    }
}

fn success_message(request: &TestRequest) -> &'static str {
    match request {
        TestRequest::SubjectWise { .. } => "Subject questions found",
        TestRequest::UnitWise { .. } => "Unit questions found",
        TestRequest::ChapterWise { .. } => "Chapter questions found",
        TestRequest::ModelTest { .. } => "Model questions found",
        TestRequest::DailyTest => "Daily test retrieved successfully",
    }
}

/// GET /testquestions/{typeoftest}?sub=&unit=&chap=&num=
pub async fn test_questions(
    State(state): State<AppState>,
    Path(typeoftest): Path<String>,
    Query(query): Query<TestQuery>,
) -> Result<Json<Value>, AppError> {
    let request = validate(&state.syllabus, &typeoftest, &query.into())?;
    let today = today_date_id();

    let questions = {
        let mut rng = rand::thread_rng();
        assemble(&state.db, &state.syllabus, &request, &today, &mut rng)?
    };
    let total = questions.len();
    log::info!("{} assembled with {} questions", request.test_type(), total);

    Ok(respond(
        success_message(&request),
        json!({
            "total": total,
            "questions": group_by_subject(&state.syllabus, questions),
        }),
    ))
}
