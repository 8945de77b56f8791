// 组卷参数校验
// 全部字段通过才生成 `TestRequest`，任一字段非法即返回指明字段的错误。

use crate::error::AppError;
use crate::models::TestType;
use crate::services::syllabus::Syllabus;

/// 科目/单元/章节练习题数范围
pub const SCOPED_MIN_QUESTIONS: usize = 5;
pub const SCOPED_MAX_QUESTIONS: usize = 50;

/// 模拟考试允许的题量
pub const MODEL_TEST_SIZES: [usize; 4] = [50, 100, 150, 200];

/// 原始查询参数
#[derive(Debug, Clone, Default)]
pub struct TestParams {
    pub sub: Option<String>,
    pub unit: Option<String>,
    pub chap: Option<String>,
    pub num: Option<String>,
}

/// 校验后的组卷请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestRequest {
    SubjectWise {
        subject: String,
        num: usize,
    },
    UnitWise {
        subject: String,
        unit: String,
        num: usize,
    },
    ChapterWise {
        subject: String,
        unit: String,
        chapter: String,
        num: usize,
    },
    ModelTest {
        num: usize,
    },
    DailyTest,
}

impl TestRequest {
    pub fn test_type(&self) -> TestType {
        match self {
            TestRequest::SubjectWise { .. } => TestType::SubjectWise,
            TestRequest::UnitWise { .. } => TestType::UnitWise,
            TestRequest::ChapterWise { .. } => TestType::ChapterWise,
            TestRequest::ModelTest { .. } => TestType::ModelTest,
            TestRequest::DailyTest => TestType::DailyTest,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_num(params: &TestParams) -> Result<usize, AppError> {
    let raw = present(&params.num).ok_or_else(|| AppError::invalid("num", "number of questions is required"))?;
    raw.parse::<usize>()
        .map_err(|_| AppError::invalid("num", format!("'{}' is not a number", raw)))
}

/// 按组卷类型校验参数
pub fn validate(
    syllabus: &Syllabus,
    typeoftest: &str,
    params: &TestParams,
) -> Result<TestRequest, AppError> {
    let test_type: TestType = typeoftest
        .parse()
        .map_err(|e: String| AppError::invalid("typeoftest", e))?;

    match test_type {
        TestType::DailyTest => Ok(TestRequest::DailyTest),
        TestType::ModelTest => {
            let num = parse_num(params)?;
            if !MODEL_TEST_SIZES.contains(&num) {
                return Err(AppError::invalid(
                    "num",
                    format!("model test size must be one of {:?}", MODEL_TEST_SIZES),
                ));
            }
            Ok(TestRequest::ModelTest { num })
        }
        scoped => {
            let sub = present(&params.sub).ok_or_else(|| AppError::invalid("sub", "subject is required"))?;
            let subject = syllabus
                .subject(sub)
                .ok_or_else(|| AppError::invalid("sub", format!("unknown subject '{}'", sub)))?;

            let unit = if scoped == TestType::SubjectWise {
                None
            } else {
                let unit = present(&params.unit).ok_or_else(|| AppError::invalid("unit", "unit is required"))?;
                let unit = subject.unit(unit).ok_or_else(|| {
                    AppError::invalid("unit", format!("'{}' is not a unit of {}", unit, subject.name))
                })?;
                Some(unit)
            };

            let chapter = match (scoped, unit) {
                (TestType::ChapterWise, Some(unit)) => {
                    let chap = present(&params.chap).ok_or_else(|| AppError::invalid("chap", "chapter is required"))?;
                    if !syllabus.has_chapter(&subject.name, &unit.mergedunit, chap) {
                        return Err(AppError::invalid(
                            "chap",
                            format!("'{}' is not a chapter of {}", chap, unit.mergedunit),
                        ));
                    }
                    Some(chap.to_string())
                }
                _ => None,
            };

            let num = parse_num(params)?;
            if !(SCOPED_MIN_QUESTIONS..=SCOPED_MAX_QUESTIONS).contains(&num) {
                return Err(AppError::invalid(
                    "num",
                    format!(
                        "number of questions must be in range {} - {}",
                        SCOPED_MIN_QUESTIONS, SCOPED_MAX_QUESTIONS
                    ),
                ));
            }

            let subject = subject.name.clone();
            Ok(match (unit, chapter) {
                (Some(unit), Some(chapter)) => TestRequest::ChapterWise {
                    subject,
                    unit: unit.mergedunit.clone(),
                    chapter,
                    num,
                },
                (Some(unit), None) => TestRequest::UnitWise {
                    subject,
                    unit: unit.mergedunit.clone(),
                    num,
                },
                _ => TestRequest::SubjectWise { subject, num },
            })
        }
    }
}
