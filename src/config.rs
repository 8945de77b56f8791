// 启动配置
// 命令行参数，均可通过环境变量覆盖

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Parser)]
#[command(name = "qbank", version, about = "Question bank and test assembly server")]
pub struct Cli {
    #[command(flatten)]
    pub common: Common,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 启动 HTTP 服务
    Serve(Serve),
    /// 依据题目表重建科目索引
    Reindex,
    /// 写入开发用占位题目
    Seed(Seed),
}

#[derive(Debug, Clone, Args)]
pub struct Common {
    /// SQLite 数据库文件
    #[arg(long, global = true, env = "QBANK_DATABASE")]
    pub database: Option<PathBuf>,

    /// 大纲 JSON 文件，缺省使用内置大纲
    #[arg(long, global = true, env = "QBANK_SYLLABUS")]
    pub syllabus: Option<PathBuf>,

    #[arg(long, global = true, env = "QBANK_LOG", default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Args)]
pub struct Serve {
    #[arg(long, env = "QBANK_HOST")]
    pub host: Option<IpAddr>,

    #[arg(short, long, env = "QBANK_PORT")]
    pub port: Option<u16>,

    /// 允许跨域访问的来源，缺省不限
    #[arg(long = "origin", value_delimiter = ',')]
    pub origins: Vec<String>,
}

impl Serve {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host.unwrap_or(DEFAULT_HOST), self.port.unwrap_or(DEFAULT_PORT))
    }
}

#[derive(Debug, Clone, Args)]
pub struct Seed {
    /// 每个单元的题目数，0 表示按单元权重
    #[arg(long, default_value_t = 0)]
    pub per_unit: usize,

    #[arg(long, default_value = "seed")]
    pub author: String,

    /// 直接标记为已审核
    #[arg(long)]
    pub verified: bool,
}
