// 题目审核流程
// 添加、审核（单向）、举报三组独立标记；科目/单元变更时同步迁移科目索引。

use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Difficulty, Flag, OptionLabel, Question, QuestionOptions, ReportFlag, ReviewQueue};
use crate::services::database::{DatabaseService, QuestionFilter};
use crate::services::sampling;
use crate::services::syllabus::Syllabus;

/// 前端提交的题目（新增或审核）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionElement {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: QuestionOptions,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub chapter: String,
    #[serde(default)]
    pub mergedunit: String,
    #[serde(default)]
    pub ispast: bool,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub isadded: Option<Flag>,
    #[serde(default)]
    pub isreviewed: Option<Flag>,
}

/// 保存结果
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub message: &'static str,
    pub question: Question,
}

/// 题目内容字段校验结果
struct Content {
    answer: OptionLabel,
    difficulty: Difficulty,
}

fn check_content(syllabus: &Syllabus, el: &QuestionElement) -> Result<Content, AppError> {
    if el.question.trim().is_empty() {
        return Err(AppError::invalid("question", "question text is required"));
    }
    let opts = &el.options;
    if [&opts.a, &opts.b, &opts.c, &opts.d].iter().any(|o| o.trim().is_empty()) {
        return Err(AppError::invalid("options", "all four options are required"));
    }
    let answer: OptionLabel = el.answer.parse().map_err(|e: String| AppError::invalid("answer", e))?;
    let difficulty: Difficulty = el
        .difficulty
        .parse()
        .map_err(|e: String| AppError::invalid("difficulty", e))?;

    let subject = syllabus
        .subject(&el.subject)
        .ok_or_else(|| AppError::invalid("subject", format!("unknown subject '{}'", el.subject)))?;
    let unit = subject.unit(&el.mergedunit).ok_or_else(|| {
        AppError::invalid(
            "mergedunit",
            format!("'{}' is not a unit of {}", el.mergedunit, subject.name),
        )
    })?;
    if !unit.topics.iter().any(|t| t == &el.chapter) {
        return Err(AppError::invalid(
            "chapter",
            format!("'{}' is not a chapter of {}", el.chapter, unit.mergedunit),
        ));
    }

    Ok(Content { answer, difficulty })
}

fn non_empty_by(flag: &Option<Flag>) -> Option<&str> {
    flag.as_ref()
        .map(|f| f.by.trim())
        .filter(|by| !by.is_empty())
}

/// 保存题目：无 `_id` 为新增，有 `_id` 为审核
pub fn save_question(
    db: &DatabaseService,
    syllabus: &Syllabus,
    el: QuestionElement,
) -> Result<SaveOutcome, AppError> {
    let content = check_content(syllabus, &el)?;

    match el.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        None => {
            let by = non_empty_by(&el.isadded)
                .ok_or_else(|| AppError::invalid("isadded", "creator is required"))?
                .to_string();
            let question = Question {
                id: Uuid::new_v4().to_string(),
                question: el.question,
                options: el.options,
                answer: content.answer,
                explanation: el.explanation,
                subject: el.subject,
                chapter: el.chapter,
                mergedunit: el.mergedunit,
                difficulty: content.difficulty,
                ispast: el.ispast,
                isadded: Flag { state: true, by },
                isverified: Flag::default(),
                isreported: ReportFlag::default(),
            };
            db.insert_question(&question)?;
            log::info!("question {} added by {}", question.id, question.isadded.by);
            Ok(SaveOutcome {
                message: "Question Added Successfully",
                question,
            })
        }
        Some(id) => {
            let reviewer = non_empty_by(&el.isreviewed)
                .ok_or_else(|| AppError::invalid("isreviewed", "reviewer is required"))?
                .to_string();
            let existing = db
                .get_question(id)?
                .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

            let moved = existing.subject != el.subject || existing.mergedunit != el.mergedunit;
            let question = Question {
                id: existing.id,
                question: el.question,
                options: el.options,
                answer: content.answer,
                explanation: el.explanation,
                subject: el.subject,
                chapter: el.chapter,
                mergedunit: el.mergedunit,
                difficulty: content.difficulty,
                ispast: el.ispast,
                isadded: existing.isadded,
                isverified: Flag {
                    state: true,
                    by: reviewer,
                },
                isreported: existing.isreported,
            };
            if !db.update_question(&question)? {
                return Err(AppError::NotFound("Question not found".to_string()));
            }
            if moved {
                log::info!(
                    "question {} moved from {}/{} to {}/{}",
                    question.id,
                    existing.subject,
                    existing.mergedunit,
                    question.subject,
                    question.mergedunit
                );
            }
            log::info!("question {} reviewed by {}", question.id, question.isverified.by);
            Ok(SaveOutcome {
                message: "Question Reviewed Successfully",
                question,
            })
        }
    }
}

/// 举报题目
pub fn report_question(
    db: &DatabaseService,
    question_id: &str,
    message: &str,
    user_id: &str,
) -> Result<Question, AppError> {
    if question_id.trim().is_empty() || message.trim().is_empty() {
        return Err(AppError::BadRequest("Missing parameters".to_string()));
    }
    if !db.set_reported(question_id, user_id, message)? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }
    log::info!("question {} reported by {}", question_id, user_id);
    db.get_question(question_id)?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))
}

/// 待审核题目抽样
pub fn review_questions<R: Rng + ?Sized>(
    db: &DatabaseService,
    n: Option<&str>,
    queue: ReviewQueue,
    rng: &mut R,
) -> Result<Vec<Question>, AppError> {
    let n = n
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid("n", "Missing parameter: number of questions"))?;
    let n: usize = n
        .parse()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| AppError::invalid("n", format!("'{}' is not a positive number", n)))?;

    let filter = match queue {
        ReviewQueue::Reported => QuestionFilter {
            reported: Some(true),
            ..Default::default()
        },
        ReviewQueue::Unverified => QuestionFilter {
            verified: Some(false),
            ..Default::default()
        },
    };
    let chosen = sampling::sample(rng, db.question_ids(&filter)?, n);
    Ok(db.get_questions(&chosen)?)
}

/// 按 id 获取题目
pub fn get_question(db: &DatabaseService, id: Option<&str>) -> Result<Question, AppError> {
    let id = id
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid("i", "Missing parameter: question ID"))?;
    db.get_question(id)?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn element(subject: &str, unit: &str, chapter: &str) -> QuestionElement {
        QuestionElement {
            id: None,
            question: "Which phase separates chromatids?".into(),
            options: QuestionOptions {
                a: "prophase".into(),
                b: "metaphase".into(),
                c: "anaphase".into(),
                d: "telophase".into(),
            },
            answer: "c".into(),
            explanation: "Chromatids separate in anaphase.".into(),
            subject: subject.into(),
            chapter: chapter.into(),
            mergedunit: unit.into(),
            ispast: false,
            difficulty: "m".into(),
            isadded: Some(Flag {
                state: true,
                by: "author-1".into(),
            }),
            isreviewed: None,
        }
    }

    fn setup() -> (DatabaseService, Syllabus) {
        (DatabaseService::open_in_memory().unwrap(), Syllabus::embedded().unwrap())
    }

    #[test]
    fn test_add_question_sets_flags_and_index() {
        let (db, syllabus) = setup();
        let saved = save_question(&db, &syllabus, element("botany", "bot-cell-biology", "cell division")).unwrap();

        assert_eq!(saved.message, "Question Added Successfully");
        let q = db.get_question(&saved.question.id).unwrap().unwrap();
        assert!(q.isadded.state);
        assert_eq!(q.isadded.by, "author-1");
        assert!(!q.isverified.state);
        assert!(!q.isreported.state);
        assert_eq!(
            db.index_entries_for(&q.id).unwrap(),
            vec![("botany".to_string(), "bot-cell-biology".to_string())]
        );
    }

    #[test]
    fn test_rejects_question_outside_taxonomy() {
        let (db, syllabus) = setup();
        let err = save_question(&db, &syllabus, element("botany", "zoo-animal-forms", "frog")).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { field: "mergedunit", .. }));

        let err = save_question(&db, &syllabus, element("botany", "bot-cell-biology", "frog")).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { field: "chapter", .. }));

        let mut el = element("botany", "bot-cell-biology", "cell division");
        el.answer = "e".into();
        let err = save_question(&db, &syllabus, el).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { field: "answer", .. }));

        let mut el = element("botany", "bot-cell-biology", "cell division");
        el.isadded = None;
        let err = save_question(&db, &syllabus, el).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { field: "isadded", .. }));
        assert_eq!(db.count_questions().unwrap(), 0);
    }

    #[test]
    fn test_review_relocates_subject_index() {
        let (db, syllabus) = setup();
        let saved = save_question(&db, &syllabus, element("botany", "bot-cell-biology", "cell division")).unwrap();

        let mut el = element("zoology", "zoo-human-physiology", "nervous system");
        el.id = Some(saved.question.id.clone());
        el.isadded = None;
        el.isreviewed = Some(Flag {
            state: true,
            by: "reviewer-9".into(),
        });
        let reviewed = save_question(&db, &syllabus, el).unwrap();
        assert_eq!(reviewed.message, "Question Reviewed Successfully");

        let q = db.get_question(&saved.question.id).unwrap().unwrap();
        assert!(q.isverified.state);
        assert_eq!(q.isverified.by, "reviewer-9");
        assert_eq!(q.isadded.by, "author-1");
        assert_eq!(q.subject, "zoology");

        assert_eq!(
            db.index_entries_for(&q.id).unwrap(),
            vec![("zoology".to_string(), "zoo-human-physiology".to_string())]
        );
        assert!(db.subject_index_ids("botany").unwrap().is_empty());
    }

    #[test]
    fn test_review_same_unit_keeps_single_entry() {
        let (db, syllabus) = setup();
        let saved = save_question(&db, &syllabus, element("physics", "phy-mechanics", "kinematics")).unwrap();

        let mut el = element("physics", "phy-mechanics", "gravitation");
        el.id = Some(saved.question.id.clone());
        el.isreviewed = Some(Flag {
            state: true,
            by: "r".into(),
        });
        save_question(&db, &syllabus, el).unwrap();
        assert_eq!(db.index_entries_for(&saved.question.id).unwrap().len(), 1);
        assert_eq!(db.subject_index_count("physics").unwrap(), 1);
    }

    #[test]
    fn test_review_requires_reviewer_and_existing_question() {
        let (db, syllabus) = setup();
        let mut el = element("physics", "phy-mechanics", "kinematics");
        el.id = Some("missing".into());
        let err = save_question(&db, &syllabus, el.clone()).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { field: "isreviewed", .. }));

        el.isreviewed = Some(Flag {
            state: true,
            by: "r".into(),
        });
        let err = save_question(&db, &syllabus, el).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_report_question() {
        let (db, syllabus) = setup();
        let saved = save_question(&db, &syllabus, element("mat", "mat-verbal-reasoning", "analogy")).unwrap();

        let q = report_question(&db, &saved.question.id, "answer is wrong", "user-5").unwrap();
        assert!(q.isreported.state);
        assert_eq!(q.isreported.by, "user-5");
        assert_eq!(q.isreported.msg, "answer is wrong");

        assert!(matches!(
            report_question(&db, "missing", "msg", "user-5"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            report_question(&db, &saved.question.id, "  ", "user-5"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_review_queue() {
        let (db, syllabus) = setup();
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(
                save_question(&db, &syllabus, element("mat", "mat-verbal-reasoning", "analogy"))
                    .unwrap()
                    .question
                    .id,
            );
        }
        report_question(&db, &ids[0], "bad", "u").unwrap();

        let mut rng = StdRng::seed_from_u64(6);
        let reported = review_questions(&db, Some("10"), ReviewQueue::Reported, &mut rng).unwrap();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].id, ids[0]);

        let unverified = review_questions(&db, Some("2"), ReviewQueue::Unverified, &mut rng).unwrap();
        assert_eq!(unverified.len(), 2);
        assert!(unverified.iter().all(|q| !q.isverified.state));

        assert!(matches!(
            review_questions(&db, None, ReviewQueue::Unverified, &mut rng),
            Err(AppError::InvalidParameter { field: "n", .. })
        ));
        assert!(review_questions(&db, Some("0"), ReviewQueue::Unverified, &mut rng).is_err());
    }

    #[test]
    fn test_get_question_by_id() {
        let (db, syllabus) = setup();
        let saved = save_question(&db, &syllabus, element("mat", "mat-verbal-reasoning", "analogy")).unwrap();
        assert_eq!(get_question(&db, Some(&saved.question.id)).unwrap().id, saved.question.id);
        assert!(matches!(get_question(&db, Some("nope")), Err(AppError::NotFound(_))));
        assert!(matches!(get_question(&db, None), Err(AppError::InvalidParameter { .. })));
    }
}
