use anyhow::Result;
use clap::Parser;

use qbank::config::Cli;
use qbank::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.log_level).map_err(|e| anyhow::anyhow!("failed to init logging: {}", e))?;
    qbank::run(cli).await
}
