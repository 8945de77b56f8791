// 数据模型模块
// 题目、审核标记、每日测试等共享数据结构，字段名与前端接口保持一致

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 题目难度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(rename = "e")]
    Easy,
    #[serde(rename = "m")]
    Medium,
    #[serde(rename = "h")]
    Hard,
    /// 历年真题风格
    #[serde(rename = "p")]
    Past,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "e",
            Difficulty::Medium => "m",
            Difficulty::Hard => "h",
            Difficulty::Past => "p",
        }
    }

    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Past,
    ];
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "e" => Ok(Difficulty::Easy),
            "m" => Ok(Difficulty::Medium),
            "h" => Ok(Difficulty::Hard),
            "p" => Ok(Difficulty::Past),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// 选项标号
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "a",
            OptionLabel::B => "b",
            OptionLabel::C => "c",
            OptionLabel::D => "d",
        }
    }

    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(OptionLabel::A),
            "b" => Ok(OptionLabel::B),
            "c" => Ok(OptionLabel::C),
            "d" => Ok(OptionLabel::D),
            other => Err(format!("unknown option label '{}'", other)),
        }
    }
}

/// 四个选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

/// 添加/审核标记
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub by: String,
}

/// 举报标记
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFlag {
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub msg: String,
}

/// 题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub options: QuestionOptions,
    pub answer: OptionLabel,
    pub explanation: String,
    pub subject: String,
    pub chapter: String,
    pub mergedunit: String,
    pub difficulty: Difficulty,
    pub ispast: bool,
    pub isadded: Flag,
    pub isverified: Flag,
    pub isreported: ReportFlag,
}

/// 组卷后返回给前端的题目，附带答题草稿字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestQuestion {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub options: QuestionOptions,
    pub answer: OptionLabel,
    pub explanation: String,
    pub subject: String,
    pub chapter: String,
    /// 用户作答，始终以空串下发
    pub uans: String,
    /// 用时（秒），始终以 0 下发
    pub timetaken: u32,
}

impl From<Question> for TestQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question: q.question,
            options: q.options,
            answer: q.answer,
            explanation: q.explanation,
            subject: q.subject,
            chapter: q.chapter,
            uans: String::new(),
            timetaken: 0,
        }
    }
}

/// 组卷类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    ChapterWise,
    UnitWise,
    SubjectWise,
    ModelTest,
    DailyTest,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::ChapterWise => "chapterwise",
            TestType::UnitWise => "unitwise",
            TestType::SubjectWise => "subjectwise",
            TestType::ModelTest => "modeltest",
            TestType::DailyTest => "dailytest",
        }
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chapterwise" => Ok(TestType::ChapterWise),
            "unitwise" => Ok(TestType::UnitWise),
            "subjectwise" => Ok(TestType::SubjectWise),
            "modeltest" => Ok(TestType::ModelTest),
            "dailytest" => Ok(TestType::DailyTest),
            other => Err(format!("unknown test type '{}'", other)),
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 待审核队列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewQueue {
    Reported,
    Unverified,
}

impl ReviewQueue {
    /// `t=reported` 取被举报题目，其余一律视为未审核
    pub fn from_param(t: Option<&str>) -> Self {
        match t {
            Some("reported") => ReviewQueue::Reported,
            _ => ReviewQueue::Unverified,
        }
    }
}

/// 每日测试答题记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAttempt {
    pub userid: String,
    pub totalscore: i64,
    pub submitted_at: String,
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAttempt {
    pub userid: String,
    pub totalscore: i64,
    pub submitted_at: String,
    pub rank: usize,
}

/// 每日测试
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTest {
    pub dateid: String,
    pub archive: bool,
    pub question_ids: Vec<String>,
    pub created_at: String,
}

/// 排行：按分数降序，同分保持提交顺序
pub fn rank_attempts(mut attempts: Vec<DailyAttempt>) -> Vec<RankedAttempt> {
    attempts.sort_by(|a, b| b.totalscore.cmp(&a.totalscore));
    attempts
        .into_iter()
        .enumerate()
        .map(|(idx, a)| RankedAttempt {
            userid: a.userid,
            totalscore: a.totalscore,
            submitted_at: a.submitted_at,
            rank: idx + 1,
        })
        .collect()
}
