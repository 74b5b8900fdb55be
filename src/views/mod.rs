//! 只读看板：订单列表、KPI、库存表
//!
//! 每个视图拉取一次集合并整体替换当前快照；拉取失败时显示占位（Unavailable / Error）并记录日志，不重试。

pub mod inventory;
pub mod kpi;
pub mod orders;

pub use inventory::{add_product, update_quantity, InventoryError, InventoryForm, InventoryView};
pub use kpi::{spawn_kpi_poller, KpiPanel, KpiValue};
pub use orders::{format_order, OrdersView};

/// 视图快照：尚未加载 / 已加载 / 拉取失败
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Unavailable,
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ViewState::Unavailable)
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}
