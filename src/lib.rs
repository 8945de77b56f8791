// 题库与组卷服务
// 服务层负责大纲、存储与抽题逻辑，命令层暴露 HTTP 接口

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::commands::AppState;
use crate::config::{Cli, Commands, Common, Serve};
use crate::services::{seed, DatabaseService, Syllabus};

/// 加载大纲：指定文件优先，否则使用内置大纲
pub fn load_syllabus(common: &Common) -> Result<Syllabus> {
    match &common.syllabus {
        Some(path) => Syllabus::from_file(path),
        None => Syllabus::embedded(),
    }
}

pub fn open_database(common: &Common) -> Result<DatabaseService> {
    let path = common
        .database
        .clone()
        .unwrap_or_else(utils::default_database_path);
    log::info!("using database {}", path.display());
    DatabaseService::open(&path)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {}", o))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(origins))
}

async fn serve(state: AppState, opts: &Serve) -> Result<()> {
    let app = commands::router(state).layer(cors_layer(&opts.origins)?);
    let addr = opts.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
    }
}

/// 执行命令行指定的子命令
pub async fn run(cli: Cli) -> Result<()> {
    let syllabus = load_syllabus(&cli.common)?;
    let db = open_database(&cli.common)?;

    match cli.command {
        Commands::Serve(opts) => serve(AppState::new(db, syllabus), &opts).await,
        Commands::Reindex => {
            let entries = db.rebuild_subject_index()?;
            log::info!("subject index rebuilt with {} entries", entries);
            Ok(())
        }
        Commands::Seed(opts) => {
            let mut rng = rand::thread_rng();
            seed::seed(&db, &syllabus, opts.per_unit, &opts.author, opts.verified, &mut rng)?;
            Ok(())
        }
    }
}
