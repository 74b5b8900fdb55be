//! Mock 仓储后端（用于测试与离线演示，无需服务端）
//!
//! 按 (start, goal) 预置规划结果，记录每一次调用；create_order / execute 会像真实后端一样
//! 维护订单表（pending → completed），便于验证「订单列表总是来自服务端」。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::types::{AgvStatus, InventoryItem, NewInventoryItem, OrderId, OrderRecord};
use crate::api::{ApiError, WarehouseApi};
use crate::grid::{Coordinate, Grid};

/// 记录下来的一次后端调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Grid,
    Plan { start: Coordinate, goal: Coordinate },
    CreateOrder { pickup: Coordinate, delivery: Coordinate },
    Execute { path: Vec<Coordinate>, order_id: OrderId },
    Orders,
    AgvStatus,
    Inventory,
    AddInventory(NewInventoryItem),
    UpdateQuantity { id: u64, quantity: i64 },
}

/// 选择性失败的判定函数
struct FailWhen(fn(&ApiCall) -> bool);

impl std::fmt::Debug for FailWhen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FailWhen(..)")
    }
}

#[derive(Debug, Default)]
struct MockState {
    grid: Option<Grid>,
    routes: HashMap<(Coordinate, Coordinate), Vec<Coordinate>>,
    /// 未预置路线时按曼哈顿折线走（仅演示模式）
    walk_fallback: bool,
    next_order_id: Option<u64>,
    /// 设置后订单号为字符串 `<prefix><n>`
    text_id_prefix: Option<String>,
    omit_order_id: bool,
    orders: Vec<OrderRecord>,
    inventory: Vec<InventoryItem>,
    agv_status: String,
    failing: bool,
    /// 只让命中的调用失败
    fail_when: Option<FailWhen>,
    calls: Vec<ApiCall>,
}

/// Mock 后端：线程安全，可在 Arc<dyn WarehouseApi> 中共享
#[derive(Debug)]
pub struct MockWarehouseApi {
    state: Mutex<MockState>,
}

impl Default for MockWarehouseApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWarehouseApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_order_id: Some(1),
                agv_status: "idle".to_string(),
                ..MockState::default()
            }),
        }
    }

    /// 演示后端：9x9 网格、几个障碍与取送货点，未预置的路线按折线走
    pub fn demo() -> Self {
        let mut raw = vec![vec![0i64; 9]; 9];
        for (r, c) in [(2, 4), (3, 4), (4, 4), (6, 2), (6, 3)] {
            raw[r][c] = 1;
        }
        raw[3][2] = 2;
        raw[1][7] = 3;
        let mock = Self::new().with_grid(Grid::from(raw));
        mock.lock().walk_fallback = true;
        mock
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // 测试代码里 panic 后锁可能中毒，数据仍可用
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_grid(self, grid: Grid) -> Self {
        self.lock().grid = Some(grid);
        self
    }

    /// 预置 start → goal 的规划结果（空 Vec 表示无路）
    pub fn with_route(self, start: Coordinate, goal: Coordinate, path: Vec<Coordinate>) -> Self {
        self.lock().routes.insert((start, goal), path);
        self
    }

    /// 下一个订单使用的 id
    pub fn with_next_order_id(self, id: u64) -> Self {
        self.lock().next_order_id = Some(id);
        self
    }

    /// 订单号改用字符串（如 `A-1`）
    pub fn with_text_order_ids(self, prefix: &str) -> Self {
        self.lock().text_id_prefix = Some(prefix.to_string());
        self
    }

    /// 创建订单时响应中不带 order_id
    pub fn without_order_ids(self) -> Self {
        self.lock().omit_order_id = true;
        self
    }

    pub fn with_orders(self, orders: Vec<OrderRecord>) -> Self {
        self.lock().orders = orders;
        self
    }

    pub fn with_inventory(self, items: Vec<InventoryItem>) -> Self {
        self.lock().inventory = items;
        self
    }

    /// 之后所有调用都返回 Transport 错误
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// 命中 pred 的调用返回 Transport 错误（仍会被记录）
    pub fn fail_when(self, pred: fn(&ApiCall) -> bool) -> Self {
        self.lock().fail_when = Some(FailWhen(pred));
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// 服务端订单表（按 id 倒序，与后端一致）
    pub fn server_orders(&self) -> Vec<OrderRecord> {
        let mut orders = self.lock().orders.clone();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        orders
    }

    fn record(&self, call: ApiCall) -> Result<std::sync::MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.lock();
        let fail = state.failing || state.fail_when.as_ref().is_some_and(|f| (f.0)(&call));
        state.calls.push(call);
        if fail {
            return Err(ApiError::Transport("mock backend offline".to_string()));
        }
        Ok(state)
    }
}

/// 先走行再走列的折线，不绕障碍
fn manhattan_walk(start: Coordinate, goal: Coordinate) -> Vec<Coordinate> {
    let mut path = vec![start];
    let mut cur = start;
    while cur.row != goal.row {
        cur.row = if cur.row < goal.row { cur.row + 1 } else { cur.row - 1 };
        path.push(cur);
    }
    while cur.col != goal.col {
        cur.col = if cur.col < goal.col { cur.col + 1 } else { cur.col - 1 };
        path.push(cur);
    }
    path
}

#[async_trait]
impl WarehouseApi for MockWarehouseApi {
    async fn grid(&self) -> Result<Grid, ApiError> {
        let state = self.record(ApiCall::Grid)?;
        state
            .grid
            .clone()
            .ok_or_else(|| ApiError::Status(404))
    }

    async fn plan(
        &self,
        start: Coordinate,
        goal: Coordinate,
    ) -> Result<Vec<Coordinate>, ApiError> {
        let state = self.record(ApiCall::Plan { start, goal })?;
        if let Some(path) = state.routes.get(&(start, goal)) {
            return Ok(path.clone());
        }
        if state.walk_fallback {
            return Ok(manhattan_walk(start, goal));
        }
        Ok(Vec::new())
    }

    async fn create_order(
        &self,
        pickup: Coordinate,
        delivery: Coordinate,
    ) -> Result<Option<OrderId>, ApiError> {
        let mut state = self.record(ApiCall::CreateOrder { pickup, delivery })?;
        let n = state.next_order_id.unwrap_or(1);
        state.next_order_id = Some(n + 1);
        let id = match &state.text_id_prefix {
            Some(prefix) => OrderId::Text(format!("{}{}", prefix, n)),
            None => OrderId::Number(n),
        };
        state.orders.push(OrderRecord {
            id: id.clone(),
            pickup_r: pickup.row.into(),
            pickup_c: pickup.col.into(),
            delivery_r: delivery.row.into(),
            delivery_c: delivery.col.into(),
            status: Some("pending".to_string()),
            created_at: None,
        });
        Ok(if state.omit_order_id { None } else { Some(id) })
    }

    async fn execute(&self, path: &[Coordinate], order_id: &OrderId) -> Result<(), ApiError> {
        let mut state = self.record(ApiCall::Execute {
            path: path.to_vec(),
            order_id: order_id.clone(),
        })?;
        if path.is_empty() {
            return Err(ApiError::Rejected("path required".to_string()));
        }
        if let Some(order) = state.orders.iter_mut().find(|o| &o.id == order_id) {
            order.status = Some("completed".to_string());
        }
        Ok(())
    }

    async fn orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        drop(self.record(ApiCall::Orders)?);
        Ok(self.server_orders())
    }

    async fn agv_status(&self) -> Result<AgvStatus, ApiError> {
        let state = self.record(ApiCall::AgvStatus)?;
        Ok(AgvStatus {
            status: state.agv_status.clone(),
            r: None,
            c: None,
        })
    }

    async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
        let state = self.record(ApiCall::Inventory)?;
        Ok(state.inventory.clone())
    }

    async fn add_inventory(&self, item: &NewInventoryItem) -> Result<(), ApiError> {
        let mut state = self.record(ApiCall::AddInventory(item.clone()))?;
        let occupied = state.inventory.iter().any(|i| {
            i.zone == item.zone
                && i.rack == item.rack
                && i.row_loc == item.row_loc
                && i.col_loc == item.col_loc
        });
        if occupied {
            return Err(ApiError::Rejected(format!(
                "Rack {}-{} at ({},{}) is already occupied",
                item.zone, item.rack, item.row_loc, item.col_loc
            )));
        }
        let id = state.inventory.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        state.inventory.push(InventoryItem {
            id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            zone: item.zone.clone(),
            rack: item.rack.clone(),
            row_loc: item.row_loc,
            col_loc: item.col_loc,
        });
        Ok(())
    }

    async fn update_quantity(&self, id: u64, quantity: i64) -> Result<(), ApiError> {
        let mut state = self.record(ApiCall::UpdateQuantity { id, quantity })?;
        if let Some(item) = state.inventory.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
        Ok(())
    }
}
