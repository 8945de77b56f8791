// 组卷服务
// 根据校验后的请求从题库抽题，并按科目分组输出。

use indexmap::IndexMap;
use rand::Rng;

use crate::error::AppError;
use crate::models::TestQuestion;
use crate::services::database::{DatabaseService, QuestionFilter};
use crate::services::sampling;
use crate::services::syllabus::{Syllabus, FULL_EXAM_QUESTIONS};
use crate::services::validator::TestRequest;

/// 科目 → 题目列表，按大纲科目顺序
pub type GroupedQuestions = IndexMap<String, Vec<TestQuestion>>;

/// 按科目分组；大纲中的每个科目都有对应键
pub fn group_by_subject(syllabus: &Syllabus, questions: Vec<TestQuestion>) -> GroupedQuestions {
    let mut grouped: GroupedQuestions = syllabus
        .subject_names()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    for q in questions {
        match grouped.get_mut(&q.subject) {
            Some(list) => list.push(q),
            None => log::warn!("question {} has subject '{}' outside syllabus", q.id, q.subject),
        }
    }
    grouped
}

/// 模拟考试各科题量：ceil(科目权重 / 200 * 总题量)
pub fn model_test_quotas(syllabus: &Syllabus, num: usize) -> Vec<(String, usize)> {
    let full = FULL_EXAM_QUESTIONS as usize;
    syllabus
        .subjects
        .iter()
        .map(|s| {
            let quota = (s.weightage as usize * num).div_ceil(full);
            (s.name.clone(), quota)
        })
        .collect()
}

/// 组卷，返回按抽取顺序排列的题目
pub fn assemble<R: Rng + ?Sized>(
    db: &DatabaseService,
    syllabus: &Syllabus,
    request: &TestRequest,
    today: &str,
    rng: &mut R,
) -> Result<Vec<TestQuestion>, AppError> {
    match request {
        TestRequest::SubjectWise { subject, num } => {
            scoped(db, &QuestionFilter::subject(subject), *num, rng)
        }
        TestRequest::UnitWise { subject, unit, num } => {
            scoped(db, &QuestionFilter::unit(subject, unit), *num, rng)
        }
        TestRequest::ChapterWise {
            subject,
            unit,
            chapter,
            num,
        } => scoped(db, &QuestionFilter::chapter(subject, unit, chapter), *num, rng),
        TestRequest::ModelTest { num } => model_test(db, syllabus, *num, rng),
        TestRequest::DailyTest => todays_daily_test(db, today),
    }
}

fn scoped<R: Rng + ?Sized>(
    db: &DatabaseService,
    filter: &QuestionFilter,
    num: usize,
    rng: &mut R,
) -> Result<Vec<TestQuestion>, AppError> {
    let pool = db.question_ids(filter)?;
    if pool.is_empty() {
        return Err(AppError::NotFound("No questions found".to_string()));
    }
    if pool.len() < num {
        log::warn!("requested {} questions but only {} available for {:?}", num, pool.len(), filter);
    }

    let chosen = sampling::sample(rng, pool, num);
    let questions = db.get_questions(&chosen)?;
    Ok(questions.into_iter().map(TestQuestion::from).collect())
}

/// 各科按配额从科目索引抽题后拼接；总数超出时从末尾截断，
/// 超出部分总是落在最后处理的科目上
fn model_test<R: Rng + ?Sized>(
    db: &DatabaseService,
    syllabus: &Syllabus,
    num: usize,
    rng: &mut R,
) -> Result<Vec<TestQuestion>, AppError> {
    let mut picked = Vec::with_capacity(num + syllabus.subjects.len());

    for (subject, quota) in model_test_quotas(syllabus, num) {
        let pool = db.subject_index_ids(&subject)?;
        let take = quota.min(pool.len());
        if take < quota {
            log::warn!("model test: {} has {} questions, quota {}", subject, pool.len(), quota);
        }
        let chosen = sampling::sample(rng, pool, take);
        picked.extend(db.get_questions(&chosen)?.into_iter().map(TestQuestion::from));
    }

    if picked.len() > num {
        log::debug!("model test: trimming {} surplus questions", picked.len() - num);
        picked.truncate(num);
    }
    Ok(picked)
}

/// 当天未归档的每日测试
fn todays_daily_test(db: &DatabaseService, today: &str) -> Result<Vec<TestQuestion>, AppError> {
    let test = db
        .get_daily_test(today)?
        .filter(|t| !t.archive)
        .ok_or_else(|| AppError::NotFound("Daily test not found".to_string()))?;

    let questions = db.get_questions(&test.question_ids)?;
    Ok(questions.into_iter().map(TestQuestion::from).collect())
}
