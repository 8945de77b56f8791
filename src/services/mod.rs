// 服务模块
// 提供核心业务逻辑服务

pub mod assembler;
pub mod daily;
pub mod database;
pub mod moderation;
pub mod sampling;
pub mod seed;
pub mod syllabus;
pub mod validator;

pub use assembler::{assemble, group_by_subject, model_test_quotas, GroupedQuestions};
pub use database::{ArchiveOutcome, DatabaseService, QuestionFilter, DEFAULT_DB_PATH};
pub use moderation::{QuestionElement, SaveOutcome};
pub use syllabus::{Subject, Syllabus, Unit};
pub use validator::{validate, TestParams, TestRequest};
