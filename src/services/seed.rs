// 开发用题库填充
// 为大纲中每个单元生成占位题目，便于本地联调组卷。

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::models::{Difficulty, Flag, OptionLabel, Question, QuestionOptions, ReportFlag};
use crate::services::database::DatabaseService;
use crate::services::syllabus::Syllabus;

/// 生成占位题目，每个单元 `per_unit` 道（为 0 时按单元权重）
pub fn placeholder_questions<R: Rng + ?Sized>(
    syllabus: &Syllabus,
    per_unit: usize,
    author: &str,
    verified: bool,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions = Vec::new();
    for (subject, unit) in syllabus.units() {
        let count = if per_unit == 0 { unit.weightage as usize } else { per_unit };
        for _ in 0..count {
            let topic = unit
                .topics
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| unit.mergedunit.clone());
            let answer = *OptionLabel::ALL.choose(rng).unwrap_or(&OptionLabel::A);
            let difficulty = *Difficulty::ALL.choose(rng).unwrap_or(&Difficulty::Medium);

            questions.push(Question {
                id: Uuid::new_v4().to_string(),
                question: format!("Question about {}", topic),
                options: QuestionOptions {
                    a: "Option A".into(),
                    b: "Option B".into(),
                    c: "Option C".into(),
                    d: "Option D".into(),
                },
                answer,
                explanation: format!(
                    "explanation about the question from chapter {} of subject {}",
                    topic, subject.name
                ),
                subject: subject.name.clone(),
                chapter: topic,
                mergedunit: unit.mergedunit.clone(),
                difficulty,
                ispast: false,
                isadded: Flag {
                    state: true,
                    by: author.to_string(),
                },
                isverified: Flag {
                    state: verified,
                    by: if verified { author.to_string() } else { String::new() },
                },
                isreported: ReportFlag::default(),
            });
        }
    }
    questions
}

/// 写入占位题目，返回写入数量
pub fn seed<R: Rng + ?Sized>(
    db: &DatabaseService,
    syllabus: &Syllabus,
    per_unit: usize,
    author: &str,
    verified: bool,
    rng: &mut R,
) -> Result<usize> {
    let questions = placeholder_questions(syllabus, per_unit, author, verified, rng);
    for q in &questions {
        db.insert_question(q)?;
    }
    log::info!("seeded {} placeholder questions", questions.len());
    Ok(questions.len())
}
