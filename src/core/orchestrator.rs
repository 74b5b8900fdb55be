//! 仪表盘编排器：主控循环
//!
//! 负责：加载配置、创建后端/会话/订单编排器、建立 cmd/state 两个通道，
//! 并在后台任务中消费界面命令（CreateOrder/Cancel/Reset/Refresh/AddProduct/UpdateQuantity/Quit）。
//! 订单运行放到独立任务里，运行期间仍可处理 Cancel、刷新与 KPI 轮询。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::animator::AgvAnimator;
use crate::api::{create_api_from_config, WarehouseApi};
use crate::config::{load_config, AppConfig};
use crate::core::{AgvSession, DashboardState, OrderOrchestrator, StateHub};
use crate::grid::fetch_grid;
use crate::views::{self, spawn_kpi_poller, InventoryForm, InventoryView, KpiPanel};

/// 从界面发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 按取货点、送货点文本创建订单
    CreateOrder { pickup: String, delivery: String },
    /// 取消当前订单运行
    Cancel,
    /// AGV 回到起点
    Reset,
    /// 重新拉取网格、订单、KPI、库存
    Refresh,
    /// 新增库存货品
    AddProduct(InventoryForm),
    /// 修改库存数量
    UpdateQuantity { id: u64, quantity: String },
    /// 退出应用
    Quit,
}

/// 会话内共享的全部组件
pub struct Dashboard {
    api: Arc<dyn WarehouseApi>,
    hub: StateHub,
    orders: Arc<OrderOrchestrator>,
}

impl Dashboard {
    /// 按配置组装；返回 Dashboard 与状态订阅端
    pub fn new(cfg: &AppConfig, api: Arc<dyn WarehouseApi>) -> (Self, watch::Receiver<DashboardState>) {
        Self::with_animator(cfg, api, AgvAnimator::new(cfg.step_delay()))
    }

    pub fn with_animator(
        cfg: &AppConfig,
        api: Arc<dyn WarehouseApi>,
        animator: AgvAnimator,
    ) -> (Self, watch::Receiver<DashboardState>) {
        let (hub, state_rx) = StateHub::new(DashboardState::new(
            cfg.bounds(),
            cfg.agv_start(),
            cfg.dashboard.status_log_capacity,
        ));
        let session = Arc::new(AgvSession::new(cfg.agv_start(), hub.clone()));
        let orders = Arc::new(OrderOrchestrator::new(
            api.clone(),
            session,
            animator,
            hub.clone(),
            cfg.bounds(),
            cfg.pickup_dwell(),
        ));
        (Self { api, hub, orders }, state_rx)
    }

    pub fn hub(&self) -> &StateHub {
        &self.hub
    }

    pub fn orders(&self) -> &Arc<OrderOrchestrator> {
        &self.orders
    }

    /// 启动时加载：网格、订单、KPI、库存，然后提示就绪
    pub async fn init(&self) {
        self.refresh_all().await;
        self.hub
            .log("Ready — create order using inputs or click cells");
    }

    pub async fn refresh_all(&self) {
        let api = self.api.as_ref();
        let (grid, _, kpi, inventory) = tokio::join!(
            fetch_grid(api),
            self.orders.refresh_orders(),
            KpiPanel::load(api),
            InventoryView::load(api),
        );
        if grid.is_unavailable() {
            self.hub.log("Grid unavailable");
        }
        self.hub.update(|s| {
            s.grid.replace(grid);
            s.kpi = kpi;
            s.inventory = inventory;
        });
    }

    async fn refresh_inventory(&self) {
        let inventory = InventoryView::load(self.api.as_ref()).await;
        self.hub.update(|s| s.inventory = inventory);
    }

    pub async fn add_product(&self, form: &InventoryForm) {
        self.hub.clear_alert();
        match views::add_product(self.api.as_ref(), form).await {
            Ok(()) => {
                self.hub
                    .log(format!("Product Added Successfully: {}", form.product_name.trim()));
                self.refresh_inventory().await;
            }
            Err(e) => self.hub.alert(e.to_string()),
        }
    }

    pub async fn update_quantity(&self, id: u64, quantity: &str) {
        self.hub.clear_alert();
        match views::update_quantity(self.api.as_ref(), id, quantity).await {
            Ok(()) => {
                self.hub.log(format!("Quantity Updated (#{})", id));
                self.refresh_inventory().await;
            }
            Err(e) => self.hub.alert(e.to_string()),
        }
    }

    /// 处理一条命令；返回 false 表示应退出
    pub async fn handle(&self, cmd: Command) -> bool {
        match cmd {
            Command::CreateOrder { pickup, delivery } => {
                let orders = Arc::clone(&self.orders);
                tokio::spawn(async move {
                    if let Err(e) = orders.create_order(&pickup, &delivery).await {
                        tracing::info!(error = %e, "order flow ended early");
                    }
                });
            }
            Command::Cancel => {
                self.orders.cancel();
            }
            Command::Reset => {
                let _ = self.orders.reset().await;
            }
            Command::Refresh => self.refresh_all().await,
            Command::AddProduct(form) => self.add_product(&form).await,
            Command::UpdateQuantity { id, quantity } => {
                self.update_quantity(id, &quantity).await
            }
            Command::Quit => {
                self.orders.session().shutdown();
                return false;
            }
        }
        true
    }

    /// 后台：KPI 轮询 + 命令循环；cmd_tx 全部关闭或收到 Quit 时结束
    pub fn spawn(self, period: std::time::Duration) -> mpsc::UnboundedSender<Command> {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
        let shutdown = self.orders.session().shutdown_token();
        spawn_kpi_poller(self.api.clone(), self.hub.clone(), period, shutdown.clone());

        tokio::spawn(async move {
            self.init().await;
            while let Some(cmd) = cmd_rx.recv().await {
                tracing::debug!(?cmd, "command");
                if !self.handle(cmd).await {
                    break;
                }
            }
            // 发送端全部关闭时同样停止轮询与在途订单
            self.orders.session().shutdown();
            tracing::info!("dashboard loop finished");
        });

        cmd_tx
    }
}

/// 创建仪表盘运行时：返回命令发送端与状态接收端；后台任务消费命令并更新状态
pub async fn create_dashboard(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<DashboardState>)> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let api = create_api_from_config(&cfg)?;
    let (dashboard, state_rx) = Dashboard::new(&cfg, api);
    let cmd_tx = dashboard.spawn(cfg.kpi_poll_interval());
    Ok((cmd_tx, state_rx))
}
