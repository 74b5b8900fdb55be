//! KPI 面板：库存品类数、订单数、AGV 状态
//!
//! 三项并发拉取、各自独立失败（显示 Error）；后台按固定周期轮询，与订单流程互不协调。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join3;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::WarehouseApi;
use crate::core::StateHub;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum KpiValue {
    #[default]
    Loading,
    Value(String),
    Error,
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Loading => f.write_str("…"),
            KpiValue::Value(v) => f.write_str(v),
            KpiValue::Error => f.write_str("Error"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KpiPanel {
    pub inventory: KpiValue,
    pub orders: KpiValue,
    pub agv: KpiValue,
}

impl KpiPanel {
    pub async fn load(api: &dyn WarehouseApi) -> Self {
        let (inventory, orders, agv) = join3(api.inventory(), api.orders(), api.agv_status()).await;

        let inventory = match inventory {
            Ok(items) => KpiValue::Value(format!("{} Products", items.len())),
            Err(e) => {
                tracing::error!(error = %e, "Inventory load error");
                KpiValue::Error
            }
        };
        let orders = match orders {
            Ok(rows) => KpiValue::Value(format!("{} Orders", rows.len())),
            Err(e) => {
                tracing::error!(error = %e, "Order load error");
                KpiValue::Error
            }
        };
        let agv = match agv {
            Ok(status) => KpiValue::Value(status.status.to_uppercase()),
            Err(e) => {
                tracing::error!(error = %e, "AGV load error");
                KpiValue::Error
            }
        };

        Self {
            inventory,
            orders,
            agv,
        }
    }
}

/// 后台轮询 KPI，直到 shutdown 被取消
pub fn spawn_kpi_poller(
    api: Arc<dyn WarehouseApi>,
    hub: StateHub,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let panel = KpiPanel::load(api.as_ref()).await;
                    hub.update(|s| s.kpi = panel);
                }
            }
        }
        tracing::debug!("kpi poller stopped");
    })
}
