// 每日测试登记
// 每个日期最多一份试卷，创建后题目固定；归档为单向操作。

use rand::Rng;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{rank_attempts, OptionLabel, QuestionOptions, RankedAttempt};
use crate::services::database::{ArchiveOutcome, DatabaseService, QuestionFilter};
use crate::services::sampling;
use crate::services::syllabus::Syllabus;

/// 每日测试详情中的题目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyQuestionView {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub options: QuestionOptions,
    pub answer: OptionLabel,
    pub explanation: String,
}

/// 每日测试详情（含排行榜）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTestDetail {
    pub dateid: String,
    pub archive: bool,
    pub created_at: String,
    pub questions: Vec<DailyQuestionView>,
    pub usersattended: Vec<RankedAttempt>,
}

/// 为 `dateid` 生成每日测试：每个单元按权重抽取已审核、未被举报的题目。
/// 返回写入的题目数。
pub fn create<R: Rng + ?Sized>(
    db: &DatabaseService,
    syllabus: &Syllabus,
    dateid: &str,
    rng: &mut R,
) -> Result<usize, AppError> {
    if db.get_daily_test(dateid)?.is_some() {
        return Err(AppError::Conflict("Daily Test Already exist".to_string()));
    }

    let mut ids = Vec::with_capacity(syllabus.daily_test_size() as usize);
    for (subject, unit) in syllabus.units() {
        let pool = db.question_ids(&QuestionFilter::daily_eligible(&subject.name, &unit.mergedunit))?;
        if pool.is_empty() {
            log::warn!("daily test {}: no eligible questions in {}", dateid, unit.mergedunit);
        }
        ids.extend(sampling::sample(rng, pool, unit.weightage as usize));
    }

    // 事务内会再次检查日期是否已存在
    if !db.create_daily_test(dateid, &ids)? {
        return Err(AppError::Conflict("Daily Test Already exist".to_string()));
    }
    log::info!("daily test {} created with {} questions", dateid, ids.len());
    Ok(ids.len())
}

/// 归档 `dateid` 的每日测试
pub fn archive(db: &DatabaseService, dateid: &str) -> Result<(), AppError> {
    match db.archive_daily_test(dateid)? {
        ArchiveOutcome::Archived => {
            log::info!("daily test {} archived", dateid);
            Ok(())
        }
        ArchiveOutcome::AlreadyArchived => Err(AppError::Conflict("Test Already Archived".to_string())),
        ArchiveOutcome::Missing => Err(AppError::NotFound("No Test Found".to_string())),
    }
}

/// 单日详情，排行榜按分数降序计算
pub fn detail(db: &DatabaseService, dateid: &str) -> Result<DailyTestDetail, AppError> {
    let test = db
        .get_daily_test(dateid)?
        .ok_or_else(|| AppError::NotFound("cant find test".to_string()))?;

    let questions = db
        .get_questions(&test.question_ids)?
        .into_iter()
        .map(|q| DailyQuestionView {
            id: q.id,
            question: q.question,
            options: q.options,
            answer: q.answer,
            explanation: q.explanation,
        })
        .collect();

    Ok(DailyTestDetail {
        dateid: test.dateid,
        archive: test.archive,
        created_at: test.created_at,
        questions,
        usersattended: rank_attempts(db.daily_attempts(dateid)?),
    })
}

/// 提交成绩：仅限未归档试卷，每人一次
pub fn submit_attempt(
    db: &DatabaseService,
    dateid: &str,
    user_id: &str,
    totalscore: i64,
) -> Result<(), AppError> {
    if totalscore < 0 {
        return Err(AppError::invalid("totalscore", "score cannot be negative"));
    }
    let test = db
        .get_daily_test(dateid)?
        .ok_or_else(|| AppError::NotFound("Daily test not found".to_string()))?;
    if test.archive {
        return Err(AppError::Conflict("Test Already Archived".to_string()));
    }
    if !db.add_daily_attempt(dateid, user_id, totalscore)? {
        return Err(AppError::Conflict("Attempt already submitted".to_string()));
    }
    Ok(())
}
