//! AGV Dash
//!
//! 入口：加载配置、日志写文件、创建仪表盘运行时与 TUI，并运行主循环。

use anyhow::Context;
use agvdash::{config::load_config, core::create_dashboard, observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);

    // TUI 占用终端，日志只写文件
    let log_file = load_config(config_path.clone())
        .map(|cfg| cfg.logging.file)
        .unwrap_or_else(|_| "agvdash.log".into());
    observability::init_to_file(&log_file).context("Failed to open log file")?;

    // 返回命令发送端与状态接收端
    let (cmd_tx, state_rx) = create_dashboard(config_path)
        .await
        .context("Failed to create dashboard")?;

    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
