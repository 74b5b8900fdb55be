//! 订单列表：每次状态变化后从 /api/orders 重新拉取，内容与服务端完全一致

use crate::api::{OrderRecord, WarehouseApi};
use crate::views::ViewState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrdersView {
    state: ViewState<Vec<OrderRecord>>,
}

impl OrdersView {
    /// 拉取服务端当前订单表；失败时为 Unavailable，不保留旧数据
    pub async fn load(api: &dyn WarehouseApi) -> Self {
        let state = match api.orders().await {
            Ok(rows) => ViewState::Ready(rows),
            Err(e) => {
                tracing::warn!(error = %e, "order list load failed");
                ViewState::Unavailable
            }
        };
        Self { state }
    }

    pub fn state(&self) -> &ViewState<Vec<OrderRecord>> {
        &self.state
    }

    pub fn rows(&self) -> &[OrderRecord] {
        self.state.ready().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `#4 Pickup:3,2 → Delivery:1,1 │ Status: pending`
pub fn format_order(rec: &OrderRecord) -> String {
    format!(
        "#{} Pickup:{},{} → Delivery:{},{} │ Status: {}",
        rec.id,
        rec.pickup_r,
        rec.pickup_c,
        rec.delivery_r,
        rec.delivery_c,
        rec.status.as_deref().unwrap_or("?")
    )
}
