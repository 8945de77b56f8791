use chrono::{Local, NaiveDate};
use log::LevelFilter;
use std::path::PathBuf;

use crate::services::DEFAULT_DB_PATH;

const DATE_ID_FORMAT: &str = "%Y-%m-%d";

/// 当天日期 id（本地时区，YYYY-MM-DD）
pub fn today_date_id() -> String {
    date_id(Local::now().date_naive())
}

pub fn date_id(date: NaiveDate) -> String {
    date.format(DATE_ID_FORMAT).to_string()
}

/// 校验日期 id 格式
pub fn parse_date_id(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_ID_FORMAT)
        .ok()
        .filter(|d| date_id(*d) == raw)
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// 初始化日志，输出到标准输出
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // 依赖库只保留警告以上
        .level_for("hyper", LevelFilter::Warn)
        .level_for("tower_http", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_id_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date_id(date), "2026-03-07");
        assert_eq!(today_date_id().len(), 10);
    }

    #[test]
    fn test_parse_date_id() {
        assert!(parse_date_id("2026-10-14").is_some());
        assert!(parse_date_id("2026-2-1").is_none());
        assert!(parse_date_id("2026-02-30").is_none());
        assert!(parse_date_id("today").is_none());
    }
}
