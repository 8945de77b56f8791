// 每日测试接口

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{respond, AppState, AuthUser};
use crate::error::AppError;
use crate::services::daily;
use crate::utils::{parse_date_id, today_date_id};

#[derive(Debug, Default, Deserialize)]
pub struct DailyTestsQuery {
    pub i: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub dateid: Option<String>,
    pub totalscore: i64,
}

fn checked_date_id(field: &'static str, raw: &str) -> Result<String, AppError> {
    parse_date_id(raw.trim())
        .map(|_| raw.trim().to_string())
        .ok_or_else(|| AppError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", raw)))
}

/// GET /createdailytest
pub async fn create_daily_test(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let dateid = today_date_id();
    let count = {
        let mut rng = rand::thread_rng();
        daily::create(&state.db, &state.syllabus, &dateid, &mut rng)?
    };
    Ok(respond(
        "Daily test created successfully",
        json!({ "dateid": dateid, "dailytest": count }),
    ))
}

/// GET /invalidatedailytest
pub async fn invalidate_daily_test(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let dateid = today_date_id();
    daily::archive(&state.db, &dateid)?;
    Ok(respond("Daily test archived successfully", json!({ "dateid": dateid })))
}

/// GET /getdailytests?i=<dateid>
pub async fn get_daily_tests(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<DailyTestsQuery>,
) -> Result<Json<Value>, AppError> {
    match query.i.as_deref().filter(|i| !i.trim().is_empty()) {
        Some(raw) => {
            let dateid = checked_date_id("i", raw)?;
            let test = daily::detail(&state.db, &dateid)?;
            Ok(respond("Tests fetched", json!({ "test": test })))
        }
        None => {
            let tests: Vec<Value> = state
                .db
                .archived_date_ids()?
                .into_iter()
                .map(|dateid| json!({ "dateid": dateid }))
                .collect();
            Ok(respond("Tests fetched", json!({ "tests": tests })))
        }
    }
}

/// POST /submitdailytest
pub async fn submit_daily_test(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let dateid = match body.dateid.as_deref() {
        Some(raw) => checked_date_id("dateid", raw)?,
        None => today_date_id(),
    };
    daily::submit_attempt(&state.db, &dateid, &user_id, body.totalscore)?;
    log::info!("user {} submitted daily test {} with {}", user_id, dateid, body.totalscore);
    Ok(respond(
        "Attempt submitted successfully",
        json!({ "dateid": dateid, "totalscore": body.totalscore }),
    ))
}
