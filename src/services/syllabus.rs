// 教学大纲
// 科目 → 合并单元 → 章节 的层级结构，以及单元/科目出题权重。启动时加载一次，之后只读。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// 内置默认大纲
const DEFAULT_SYLLABUS: &str = include_str!("../../assets/syllabus.json");

/// 科目权重以满分 200 题的模拟考试为基准
pub const FULL_EXAM_QUESTIONS: u32 = 200;

/// 合并单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub mergedunit: String,
    pub weightage: u32,
    pub topics: Vec<String>,
}

/// 科目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub weightage: u32,
    pub units: Vec<Unit>,
}

impl Subject {
    pub fn unit(&self, mergedunit: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.mergedunit == mergedunit)
    }
}

/// 大纲
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    pub subjects: Vec<Subject>,
}

impl Syllabus {
    /// 加载内置大纲
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_SYLLABUS).context("embedded syllabus is invalid")
    }

    /// 从文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read syllabus file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid syllabus file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let syllabus: Syllabus = serde_json::from_str(content)?;
        syllabus.check()?;
        Ok(syllabus)
    }

    fn check(&self) -> Result<()> {
        if self.subjects.is_empty() {
            bail!("syllabus has no subjects");
        }
        let mut names = HashSet::new();
        let mut units = HashSet::new();
        for subject in &self.subjects {
            if !names.insert(subject.name.as_str()) {
                bail!("duplicate subject '{}'", subject.name);
            }
            for unit in &subject.units {
                if !units.insert(unit.mergedunit.as_str()) {
                    bail!("duplicate merged unit '{}'", unit.mergedunit);
                }
                if unit.topics.is_empty() {
                    bail!("merged unit '{}' has no topics", unit.mergedunit);
                }
            }
        }
        Ok(())
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn unit(&self, subject: &str, mergedunit: &str) -> Option<&Unit> {
        self.subject(subject).and_then(|s| s.unit(mergedunit))
    }

    pub fn has_chapter(&self, subject: &str, mergedunit: &str, chapter: &str) -> bool {
        self.unit(subject, mergedunit)
            .map(|u| u.topics.iter().any(|t| t == chapter))
            .unwrap_or(false)
    }

    /// 科目名，按大纲顺序
    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }

    /// 所有 (科目, 单元) 对，按大纲顺序
    pub fn units(&self) -> impl Iterator<Item = (&Subject, &Unit)> {
        self.subjects
            .iter()
            .flat_map(|s| s.units.iter().map(move |u| (s, u)))
    }

    /// 每日测试总题数
    pub fn daily_test_size(&self) -> u32 {
        self.units().map(|(_, u)| u.weightage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_syllabus_loads() {
        let syllabus = Syllabus::embedded().unwrap();
        let names: Vec<&str> = syllabus.subject_names().collect();
        assert_eq!(names, vec!["zoology", "botany", "chemistry", "physics", "mat"]);

        let total: u32 = syllabus.subjects.iter().map(|s| s.weightage).sum();
        assert_eq!(total, FULL_EXAM_QUESTIONS);

        for subject in &syllabus.subjects {
            let unit_total: u32 = subject.units.iter().map(|u| u.weightage).sum();
            assert_eq!(unit_total, subject.weightage, "{}", subject.name);
        }
    }

    #[test]
    fn test_lookup() {
        let syllabus = Syllabus::embedded().unwrap();
        assert!(syllabus.unit("botany", "bot-genetics").is_some());
        assert!(syllabus.unit("zoology", "bot-genetics").is_none());
        assert!(syllabus.has_chapter("botany", "bot-genetics", "biotechnology"));
        assert!(!syllabus.has_chapter("botany", "bot-cell-biology", "biotechnology"));
        assert!(!syllabus.has_chapter("history", "bot-genetics", "biotechnology"));
    }

    #[test]
    fn test_rejects_duplicate_unit() {
        let json = r#"{"subjects": [
            {"name": "a", "weightage": 1, "units": [{"mergedunit": "u", "weightage": 1, "topics": ["t"]}]},
            {"name": "b", "weightage": 1, "units": [{"mergedunit": "u", "weightage": 1, "topics": ["t"]}]}
        ]}"#;
        let err = Syllabus::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate merged unit"));
    }

    #[test]
    fn test_rejects_empty_topics() {
        let json = r#"{"subjects": [
            {"name": "a", "weightage": 1, "units": [{"mergedunit": "u", "weightage": 1, "topics": []}]}
        ]}"#;
        assert!(Syllabus::from_json(json).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.json");
        fs::write(&path, DEFAULT_SYLLABUS).unwrap();
        let syllabus = Syllabus::from_file(&path).unwrap();
        assert_eq!(syllabus.daily_test_size(), FULL_EXAM_QUESTIONS);

        let missing = dir.path().join("missing.json");
        assert!(Syllabus::from_file(&missing).is_err());
    }
}
