//! 仓储后端抽象
//!
//! 所有后端（HTTP / Mock）实现 WarehouseApi；路径规划对客户端是黑盒，只返回有序坐标序列。

use async_trait::async_trait;
use thiserror::Error;

use crate::api::types::{AgvStatus, InventoryItem, NewInventoryItem, OrderId, OrderRecord};
use crate::grid::{Coordinate, Grid};

/// 后端调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    /// 服务端拒绝（非 2xx 且带 `{error}`），原样展示给用户
    #[error("{0}")]
    Rejected(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// 仓储后端 trait：网格、规划、订单、AGV、库存
#[async_trait]
pub trait WarehouseApi: Send + Sync {
    /// GET /api/grid
    async fn grid(&self) -> Result<Grid, ApiError>;

    /// POST /api/plan；空 Vec 表示无路可走（包括响应中缺失 path）
    async fn plan(&self, start: Coordinate, goal: Coordinate)
        -> Result<Vec<Coordinate>, ApiError>;

    /// POST /api/orders，返回服务端分配的 order_id（可能缺失）
    async fn create_order(
        &self,
        pickup: Coordinate,
        delivery: Coordinate,
    ) -> Result<Option<OrderId>, ApiError>;

    /// POST /api/execute，通知服务端结束订单；响应内容不解释
    async fn execute(&self, path: &[Coordinate], order_id: &OrderId) -> Result<(), ApiError>;

    /// GET /api/orders
    async fn orders(&self) -> Result<Vec<OrderRecord>, ApiError>;

    /// GET /api/agv
    async fn agv_status(&self) -> Result<AgvStatus, ApiError>;

    /// GET /api/inventory
    async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError>;

    /// POST /api/inventory
    async fn add_inventory(&self, item: &NewInventoryItem) -> Result<(), ApiError>;

    /// PUT /api/inventory/{id}
    async fn update_quantity(&self, id: u64, quantity: i64) -> Result<(), ApiError>;
}
