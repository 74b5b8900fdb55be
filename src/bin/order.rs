//! 无界面下单：`agvdash-order <pickup> <delivery> [config.toml]`
//!
//! 走与 TUI 相同的订单流程，结束后打印状态日志与服务端订单列表。设置 `AGV__SERVER__BACKEND=mock`
//! 可在没有后端时演示。

use anyhow::bail;
use agvdash::{
    api::create_api_from_config,
    config::{load_config, AppConfig},
    core::{Dashboard, RunOutcome},
    observability,
    views::format_order,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let mut args = std::env::args().skip(1);
    let (Some(pickup), Some(delivery)) = (args.next(), args.next()) else {
        bail!("usage: agvdash-order <pickup r,c> <delivery r,c> [config.toml]");
    };
    let cfg = load_config(args.next().map(Into::into)).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let api = create_api_from_config(&cfg)?;
    let (dashboard, state_rx) = Dashboard::new(&cfg, api);
    dashboard.init().await;

    let result = dashboard.orders().create_order(&pickup, &delivery).await;

    let state = state_rx.borrow().clone();
    for entry in state.status.entries().collect::<Vec<_>>().into_iter().rev() {
        println!("{}", entry);
    }
    println!("--- orders ---");
    for rec in state.orders.rows() {
        println!("{}", format_order(rec));
    }

    let report = result?;
    if report.outcome == RunOutcome::Cancelled {
        bail!("order run was cancelled");
    }
    println!(
        "AGV at {} after {} + {} hops",
        state.agv,
        report.pickup_path.len().saturating_sub(1),
        report.delivery_path.len().saturating_sub(1)
    );
    Ok(())
}
