//! 状态定义：DashboardState 投影与 StateHub 发布端
//!
//! 界面只读 DashboardState 快照（阶段、AGV 位置、网格、订单、KPI、库存、状态日志、提示）；
//! 各组件通过 StateHub 原地修改后广播给所有订阅者，最后写入者生效。

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::StatusLog;
use crate::grid::{Coordinate, GridBounds, GridStore};
use crate::views::{InventoryView, KpiPanel, OrdersView};

/// 订单流程阶段：只有 Idle 时才接受新订单
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderPhase {
    Idle,
    Planning,
    Animating,
}

/// 界面看到的完整快照
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub phase: OrderPhase,
    pub agv: Coordinate,
    pub grid: GridStore,
    pub orders: OrdersView,
    pub kpi: KpiPanel,
    pub inventory: InventoryView,
    pub status: StatusLog,
    /// 需要用户立即看到的提示（输入错误、服务端拒绝等），下一次操作时清除
    pub alert: Option<String>,
}

impl DashboardState {
    pub fn new(bounds: GridBounds, agv: Coordinate, status_capacity: usize) -> Self {
        Self {
            phase: OrderPhase::Idle,
            agv,
            grid: GridStore::new(bounds),
            orders: OrdersView::default(),
            kpi: KpiPanel::default(),
            inventory: InventoryView::default(),
            status: StatusLog::new(status_capacity),
            alert: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != OrderPhase::Idle
    }
}

/// 状态发布端：可克隆，内部共享同一个 watch 通道
#[derive(Clone)]
pub struct StateHub {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl StateHub {
    pub fn new(initial: DashboardState) -> (Self, watch::Receiver<DashboardState>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// 原地修改并通知订阅者（无订阅者时同样生效）
    pub fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        self.tx.send_modify(f);
    }

    /// 追加一条状态日志
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "agvdash::status", "{}", message);
        self.update(|s| s.status.push(message));
    }

    /// 记录日志并弹出提示
    pub fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "agvdash::status", "{}", message);
        self.update(|s| {
            s.status.push(message.clone());
            s.alert = Some(message);
        });
    }

    pub fn clear_alert(&self) {
        self.update(|s| s.alert = None);
    }
}
