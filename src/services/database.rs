// 数据库服务模块
// 提供 SQLite 数据库操作：题库、科目索引、每日测试登记

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{
    DailyAttempt, DailyTest, Flag, Question, QuestionOptions, ReportFlag,
};

/// 数据库配置
pub const DEFAULT_DB_PATH: &str = "data/qbank.db";

const QUESTION_COLUMNS: &str = "id, question, option_a, option_b, option_c, option_d, answer,
     explanation, subject, chapter, mergedunit, difficulty, ispast,
     added_state, added_by, verified_state, verified_by,
     reported_state, reported_by, reported_msg";

/// 题目查询条件，None 表示不限
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub subject: Option<String>,
    pub mergedunit: Option<String>,
    pub chapter: Option<String>,
    pub added: Option<bool>,
    pub verified: Option<bool>,
    pub reported: Option<bool>,
}

impl QuestionFilter {
    pub fn subject(subject: &str) -> Self {
        Self {
            subject: Some(subject.to_string()),
            ..Default::default()
        }
    }

    pub fn unit(subject: &str, mergedunit: &str) -> Self {
        Self {
            mergedunit: Some(mergedunit.to_string()),
            ..Self::subject(subject)
        }
    }

    pub fn chapter(subject: &str, mergedunit: &str, chapter: &str) -> Self {
        Self {
            chapter: Some(chapter.to_string()),
            ..Self::unit(subject, mergedunit)
        }
    }

    /// 可进入每日测试的题目：已添加、已审核、未被举报
    pub fn daily_eligible(subject: &str, mergedunit: &str) -> Self {
        Self {
            added: Some(true),
            verified: Some(true),
            reported: Some(false),
            ..Self::unit(subject, mergedunit)
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conds = Vec::new();
        let mut values = Vec::new();

        let text = [
            ("subject", &self.subject),
            ("mergedunit", &self.mergedunit),
            ("chapter", &self.chapter),
        ];
        for (col, val) in text {
            if let Some(v) = val {
                conds.push(format!("{} = ?", col));
                values.push(Value::Text(v.clone()));
            }
        }

        let flags = [
            ("added_state", self.added),
            ("verified_state", self.verified),
            ("reported_state", self.reported),
        ];
        for (col, val) in flags {
            if let Some(v) = val {
                conds.push(format!("{} = ?", col));
                values.push(Value::Integer(v as i64));
            }
        }

        if conds.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conds.join(" AND ")), values)
        }
    }
}

/// 归档结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Archived,
    AlreadyArchived,
    Missing,
}

/// 数据库服务
#[derive(Clone)]
pub struct DatabaseService {
    pool: Arc<Mutex<Connection>>,
}

impl DatabaseService {
    /// 打开（必要时创建）数据库文件
    pub fn open(db_path: &Path) -> Result<Self> {
        // 确保数据目录存在
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data dir {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = 10000;
            PRAGMA foreign_keys = ON;
        ",
        )
        .context("Failed to set WAL mode")?;

        let service = Self {
            pool: Arc::new(Mutex::new(conn)),
        };
        service.initialize()?;
        Ok(service)
    }

    /// 内存数据库，测试与临时场景使用
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let service = Self {
            pool: Arc::new(Mutex::new(conn)),
        };
        service.initialize()?;
        Ok(service)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.pool
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// 初始化数据库表结构
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                question TEXT NOT NULL,
                option_a TEXT NOT NULL,
                option_b TEXT NOT NULL,
                option_c TEXT NOT NULL,
                option_d TEXT NOT NULL,
                answer TEXT NOT NULL CHECK(answer IN ('a', 'b', 'c', 'd')),
                explanation TEXT NOT NULL DEFAULT '',
                subject TEXT NOT NULL,
                chapter TEXT NOT NULL,
                mergedunit TEXT NOT NULL,
                difficulty TEXT NOT NULL CHECK(difficulty IN ('e', 'm', 'h', 'p')),
                ispast INTEGER NOT NULL DEFAULT 0,
                added_state INTEGER NOT NULL DEFAULT 1,
                added_by TEXT NOT NULL DEFAULT '',
                verified_state INTEGER NOT NULL DEFAULT 0,
                verified_by TEXT NOT NULL DEFAULT '',
                reported_state INTEGER NOT NULL DEFAULT 0,
                reported_by TEXT NOT NULL DEFAULT '',
                reported_msg TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_questions_scope ON questions(subject, mergedunit, chapter);
            CREATE INDEX IF NOT EXISTS idx_questions_verified ON questions(verified_state);
            CREATE INDEX IF NOT EXISTS idx_questions_reported ON questions(reported_state);

            -- 科目索引：每道题恰好一条，随题目的科目/单元同步迁移
            CREATE TABLE IF NOT EXISTS subject_index (
                question_id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                mergedunit TEXT NOT NULL,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_subject_index_unit ON subject_index(subject, mergedunit);

            CREATE TABLE IF NOT EXISTS daily_tests (
                dateid TEXT PRIMARY KEY,
                archive INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_test_questions (
                dateid TEXT NOT NULL,
                position INTEGER NOT NULL,
                question_id TEXT NOT NULL,
                PRIMARY KEY (dateid, position),
                FOREIGN KEY (dateid) REFERENCES daily_tests(dateid),
                FOREIGN KEY (question_id) REFERENCES questions(id)
            );

            CREATE TABLE IF NOT EXISTS daily_test_attempts (
                dateid TEXT NOT NULL,
                user_id TEXT NOT NULL,
                totalscore INTEGER NOT NULL,
                submitted_at TEXT NOT NULL,
                PRIMARY KEY (dateid, user_id),
                FOREIGN KEY (dateid) REFERENCES daily_tests(dateid)
            );
        ",
        )
        .context("Failed to create tables")?;

        Ok(())
    }

    // ==================== 题目 CRUD ====================

    /// 新增题目，同一事务内写入科目索引
    pub fn insert_question(&self, question: &Question) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            &format!(
                "INSERT INTO questions ({}, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                         ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?21)",
                QUESTION_COLUMNS
            ),
            params![
                question.id,
                question.question,
                question.options.a,
                question.options.b,
                question.options.c,
                question.options.d,
                question.answer.as_str(),
                question.explanation,
                question.subject,
                question.chapter,
                question.mergedunit,
                question.difficulty.as_str(),
                question.ispast,
                question.isadded.state,
                question.isadded.by,
                question.isverified.state,
                question.isverified.by,
                question.isreported.state,
                question.isreported.by,
                question.isreported.msg,
                now,
            ],
        )
        .with_context(|| format!("Failed to insert question {}", question.id))?;

        tx.execute(
            "INSERT INTO subject_index (question_id, subject, mergedunit) VALUES (?1, ?2, ?3)",
            params![question.id, question.subject, question.mergedunit],
        )
        .context("Failed to insert subject index entry")?;

        tx.commit()?;
        Ok(())
    }

    /// 更新题目内容与审核状态，同一事务内迁移科目索引（先删后插）
    pub fn update_question(&self, question: &Question) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let changed = tx
            .execute(
                "UPDATE questions SET
                    question = ?2, option_a = ?3, option_b = ?4, option_c = ?5, option_d = ?6,
                    answer = ?7, explanation = ?8, subject = ?9, chapter = ?10, mergedunit = ?11,
                    difficulty = ?12, ispast = ?13, verified_state = ?14, verified_by = ?15,
                    updated_at = ?16
                 WHERE id = ?1",
                params![
                    question.id,
                    question.question,
                    question.options.a,
                    question.options.b,
                    question.options.c,
                    question.options.d,
                    question.answer.as_str(),
                    question.explanation,
                    question.subject,
                    question.chapter,
                    question.mergedunit,
                    question.difficulty.as_str(),
                    question.ispast,
                    question.isverified.state,
                    question.isverified.by,
                    now,
                ],
            )
            .with_context(|| format!("Failed to update question {}", question.id))?;

        if changed == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM subject_index WHERE question_id = ?1",
            params![question.id],
        )?;
        tx.execute(
            "INSERT INTO subject_index (question_id, subject, mergedunit) VALUES (?1, ?2, ?3)",
            params![question.id, question.subject, question.mergedunit],
        )
        .context("Failed to relocate subject index entry")?;

        tx.commit()?;
        Ok(true)
    }

    /// 获取单道题目
    pub fn get_question(&self, id: &str) -> Result<Option<Question>> {
        let conn = self.conn()?;
        let question = conn
            .query_row(
                &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
                params![id],
                Self::row_to_question,
            )
            .optional()
            .with_context(|| format!("Failed to load question {}", id))?;
        Ok(question)
    }

    /// 按给定顺序批量获取题目，不存在的 id 被跳过
    pub fn get_questions(&self, ids: &[String]) -> Result<Vec<Question>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM questions WHERE id = ?1",
            QUESTION_COLUMNS
        ))?;

        let mut questions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(q) = stmt
                .query_row(params![id], Self::row_to_question)
                .optional()?
            {
                questions.push(q);
            }
        }
        Ok(questions)
    }

    /// 符合条件的题目 id
    pub fn question_ids(&self, filter: &QuestionFilter) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let (clause, values) = filter.where_clause();
        let mut stmt = conn.prepare(&format!("SELECT id FROM questions{} ORDER BY created_at", clause))?;
        let rows = stmt.query_map(params_from_iter(values), |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// 标记举报
    pub fn set_reported(&self, id: &str, by: &str, msg: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE questions SET reported_state = 1, reported_by = ?2, reported_msg = ?3, updated_at = ?4
             WHERE id = ?1",
            params![id, by, msg, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    pub fn count_questions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ==================== 科目索引 ====================

    /// 某科目索引中的全部题目 id
    pub fn subject_index_ids(&self, subject: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT question_id FROM subject_index WHERE subject = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![subject], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    pub fn subject_index_count(&self, subject: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM subject_index WHERE subject = ?1",
            params![subject],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 某题目的全部索引条目 (subject, mergedunit)
    pub fn index_entries_for(&self, question_id: &str) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT subject, mergedunit FROM subject_index WHERE question_id = ?1",
        )?;
        let rows = stmt.query_map(params![question_id], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// 依据题目表重建科目索引，返回写入条数
    pub fn rebuild_subject_index(&self) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM subject_index", [])?;
        let inserted = tx.execute(
            "INSERT INTO subject_index (question_id, subject, mergedunit)
             SELECT id, subject, mergedunit FROM questions",
            [],
        )?;
        tx.commit()?;
        Ok(inserted)
    }

    // ==================== 每日测试 ====================

    /// 创建每日测试；该日期已存在时返回 false 且不做任何修改
    pub fn create_daily_test(&self, dateid: &str, question_ids: &[String]) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: Option<String> = tx
            .query_row(
                "SELECT dateid FROM daily_tests WHERE dateid = ?1",
                params![dateid],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO daily_tests (dateid, archive, created_at) VALUES (?1, 0, ?2)",
            params![dateid, Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("Failed to insert daily test {}", dateid))?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO daily_test_questions (dateid, position, question_id) VALUES (?1, ?2, ?3)",
            )?;
            for (position, id) in question_ids.iter().enumerate() {
                stmt.execute(params![dateid, position as i64, id])?;
            }
        }

        tx.commit()?;
        Ok(true)
    }

    pub fn get_daily_test(&self, dateid: &str) -> Result<Option<DailyTest>> {
        let conn = self.conn()?;
        let head = conn
            .query_row(
                "SELECT dateid, archive, created_at FROM daily_tests WHERE dateid = ?1",
                params![dateid],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((dateid, archive, created_at)) = head else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT question_id FROM daily_test_questions WHERE dateid = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![dateid], |row| row.get(0))?;
        let mut question_ids = Vec::new();
        for row in rows {
            question_ids.push(row?);
        }

        Ok(Some(DailyTest {
            dateid,
            archive,
            question_ids,
            created_at,
        }))
    }

    /// 归档（单向）
    pub fn archive_daily_test(&self, dateid: &str) -> Result<ArchiveOutcome> {
        let conn = self.conn()?;
        let archive: Option<bool> = conn
            .query_row(
                "SELECT archive FROM daily_tests WHERE dateid = ?1",
                params![dateid],
                |row| row.get(0),
            )
            .optional()?;

        match archive {
            None => Ok(ArchiveOutcome::Missing),
            Some(true) => Ok(ArchiveOutcome::AlreadyArchived),
            Some(false) => {
                let changed = conn.execute(
                    "UPDATE daily_tests SET archive = 1 WHERE dateid = ?1 AND archive = 0",
                    params![dateid],
                )?;
                if changed == 0 {
                    Ok(ArchiveOutcome::AlreadyArchived)
                } else {
                    Ok(ArchiveOutcome::Archived)
                }
            }
        }
    }

    /// 已归档的日期 id，按日期倒序
    pub fn archived_date_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT dateid FROM daily_tests WHERE archive = 1 ORDER BY dateid DESC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// 记录答题成绩；同一用户重复提交返回 false
    pub fn add_daily_attempt(&self, dateid: &str, user_id: &str, totalscore: i64) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO daily_test_attempts (dateid, user_id, totalscore, submitted_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![dateid, user_id, totalscore, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// 按提交顺序返回答题记录
    pub fn daily_attempts(&self, dateid: &str) -> Result<Vec<DailyAttempt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, totalscore, submitted_at FROM daily_test_attempts
             WHERE dateid = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![dateid], |row| {
            Ok(DailyAttempt {
                userid: row.get(0)?,
                totalscore: row.get(1)?,
                submitted_at: row.get(2)?,
            })
        })?;

        let mut attempts = Vec::new();
        for row in rows {
            attempts.push(row?);
        }
        Ok(attempts)
    }

    // ==================== 辅助方法 ====================

    /// 从数据库行转换为 Question
    fn row_to_question(row: &Row) -> Result<Question, rusqlite::Error> {
        Ok(Question {
            id: row.get(0)?,
            question: row.get(1)?,
            options: QuestionOptions {
                a: row.get(2)?,
                b: row.get(3)?,
                c: row.get(4)?,
                d: row.get(5)?,
            },
            answer: parse_column(row, 6)?,
            explanation: row.get(7)?,
            subject: row.get(8)?,
            chapter: row.get(9)?,
            mergedunit: row.get(10)?,
            difficulty: parse_column(row, 11)?,
            ispast: row.get(12)?,
            isadded: Flag {
                state: row.get(13)?,
                by: row.get(14)?,
            },
            isverified: Flag {
                state: row.get(15)?,
                by: row.get(16)?,
            },
            isreported: ReportFlag {
                state: row.get(17)?,
                by: row.get(18)?,
                msg: row.get(19)?,
            },
        })
    }
}

fn parse_column<T>(row: &Row, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Difficulty, OptionLabel};

    pub(crate) fn question(id: &str, subject: &str, unit: &str, chapter: &str) -> Question {
        Question {
            id: id.to_string(),
            question: format!("Question {}", id),
            options: QuestionOptions {
                a: "A".into(),
                b: "B".into(),
                c: "C".into(),
                d: "D".into(),
            },
            answer: OptionLabel::B,
            explanation: String::new(),
            subject: subject.to_string(),
            chapter: chapter.to_string(),
            mergedunit: unit.to_string(),
            difficulty: Difficulty::Medium,
            ispast: false,
            isadded: Flag {
                state: true,
                by: "author".into(),
            },
            isverified: Flag::default(),
            isreported: ReportFlag::default(),
        }
    }

    #[test]
    fn test_insert_and_get_question() {
        let db = DatabaseService::open_in_memory().unwrap();
        let q = question("q1", "botany", "bot-genetics", "biotechnology");
        db.insert_question(&q).unwrap();

        let loaded = db.get_question("q1").unwrap().unwrap();
        assert_eq!(loaded, q);
        assert!(db.get_question("missing").unwrap().is_none());
        assert_eq!(
            db.index_entries_for("q1").unwrap(),
            vec![("botany".to_string(), "bot-genetics".to_string())]
        );
    }

    #[test]
    fn test_update_relocates_index_entry() {
        let db = DatabaseService::open_in_memory().unwrap();
        let mut q = question("q1", "botany", "bot-genetics", "biotechnology");
        db.insert_question(&q).unwrap();

        q.subject = "zoology".into();
        q.mergedunit = "zoo-animal-forms".into();
        q.chapter = "frog".into();
        assert!(db.update_question(&q).unwrap());

        assert_eq!(
            db.index_entries_for("q1").unwrap(),
            vec![("zoology".to_string(), "zoo-animal-forms".to_string())]
        );
        assert_eq!(db.subject_index_count("botany").unwrap(), 0);
        assert_eq!(db.subject_index_count("zoology").unwrap(), 1);
    }

    #[test]
    fn test_update_missing_question_leaves_index_untouched() {
        let db = DatabaseService::open_in_memory().unwrap();
        let q = question("ghost", "botany", "bot-genetics", "biotechnology");
        assert!(!db.update_question(&q).unwrap());
        assert!(db.index_entries_for("ghost").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_insert_rolls_back() {
        let db = DatabaseService::open_in_memory().unwrap();
        let q = question("q1", "botany", "bot-genetics", "biotechnology");
        db.insert_question(&q).unwrap();
        assert!(db.insert_question(&q).is_err());
        assert_eq!(db.count_questions().unwrap(), 1);
        assert_eq!(db.index_entries_for("q1").unwrap().len(), 1);
    }

    #[test]
    fn test_filter_by_flags() {
        let db = DatabaseService::open_in_memory().unwrap();
        let mut verified = question("v", "botany", "bot-genetics", "biotechnology");
        verified.isverified = Flag {
            state: true,
            by: "rev".into(),
        };
        db.insert_question(&verified).unwrap();
        db.insert_question(&question("u", "botany", "bot-genetics", "biotechnology"))
            .unwrap();

        let ids = db
            .question_ids(&QuestionFilter::daily_eligible("botany", "bot-genetics"))
            .unwrap();
        assert_eq!(ids, vec!["v".to_string()]);

        db.set_reported("v", "user", "wrong answer").unwrap();
        let ids = db
            .question_ids(&QuestionFilter::daily_eligible("botany", "bot-genetics"))
            .unwrap();
        assert!(ids.is_empty());

        let unverified = db
            .question_ids(&QuestionFilter {
                verified: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(unverified, vec!["u".to_string()]);
    }

    #[test]
    fn test_rebuild_subject_index() {
        let db = DatabaseService::open_in_memory().unwrap();
        db.insert_question(&question("q1", "botany", "bot-genetics", "biotechnology"))
            .unwrap();
        db.insert_question(&question("q2", "physics", "phy-mechanics", "kinematics"))
            .unwrap();
        {
            let conn = db.conn().unwrap();
            conn.execute("DELETE FROM subject_index WHERE question_id = 'q2'", [])
                .unwrap();
        }

        assert_eq!(db.rebuild_subject_index().unwrap(), 2);
        assert_eq!(db.subject_index_ids("physics").unwrap(), vec!["q2".to_string()]);
    }

    #[test]
    fn test_daily_test_create_is_idempotent() {
        let db = DatabaseService::open_in_memory().unwrap();
        db.insert_question(&question("q1", "botany", "bot-genetics", "biotechnology"))
            .unwrap();
        db.insert_question(&question("q2", "botany", "bot-genetics", "biotechnology"))
            .unwrap();

        let ids = vec!["q2".to_string(), "q1".to_string()];
        assert!(db.create_daily_test("2026-10-14", &ids).unwrap());
        assert!(!db
            .create_daily_test("2026-10-14", &["q1".to_string()])
            .unwrap());

        let test = db.get_daily_test("2026-10-14").unwrap().unwrap();
        assert_eq!(test.question_ids, ids);
        assert!(!test.archive);
    }

    #[test]
    fn test_archive_is_one_way() {
        let db = DatabaseService::open_in_memory().unwrap();
        assert_eq!(db.archive_daily_test("2026-10-14").unwrap(), ArchiveOutcome::Missing);

        db.create_daily_test("2026-10-14", &[]).unwrap();
        assert_eq!(db.archive_daily_test("2026-10-14").unwrap(), ArchiveOutcome::Archived);
        assert_eq!(
            db.archive_daily_test("2026-10-14").unwrap(),
            ArchiveOutcome::AlreadyArchived
        );
        assert!(db.get_daily_test("2026-10-14").unwrap().unwrap().archive);
        assert_eq!(db.archived_date_ids().unwrap(), vec!["2026-10-14".to_string()]);
    }

    #[test]
    fn test_daily_attempt_once_per_user() {
        let db = DatabaseService::open_in_memory().unwrap();
        db.create_daily_test("2026-10-14", &[]).unwrap();
        assert!(db.add_daily_attempt("2026-10-14", "u1", 120).unwrap());
        assert!(!db.add_daily_attempt("2026-10-14", "u1", 150).unwrap());
        assert!(db.add_daily_attempt("2026-10-14", "u2", 90).unwrap());

        let attempts = db.daily_attempts("2026-10-14").unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].totalscore, 120);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("qbank.db");
        {
            let db = DatabaseService::open(&path).unwrap();
            db.insert_question(&question("q1", "mat", "mat-verbal-reasoning", "analogy"))
                .unwrap();
        }
        let db = DatabaseService::open(&path).unwrap();
        assert_eq!(db.count_questions().unwrap(), 1);
    }
}
