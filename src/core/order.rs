//! 订单编排：一次「创建订单」从输入到刷新列表的完整流程
//!
//! 步骤逐级放行：解析坐标 → 规划到取货点 → 规划到送货点 → 创建订单 → 动画（取货段、停留、送货段）
//! → 有 order_id 时通知 execute → 无论成败都刷新订单列表。
//! 两次规划都成功后才创建订单，因此送货点不可达时不会留下悬空订单；界面上的订单永远来自服务端。

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::animator::{pause, AgvAnimator, AnimationOutcome};
use crate::api::{OrderId, WarehouseApi};
use crate::core::{AgvSession, Leg, OrderError, OrderGuard, OrderPhase, StateHub};
use crate::grid::{parse_coordinate, Coordinate, GridBounds};
use crate::views::OrdersView;

/// 动画阶段的结局
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Delivered,
    Cancelled,
}

/// 一次成功创建的订单运行结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderReport {
    pub pickup: Coordinate,
    pub delivery: Coordinate,
    pub order_id: Option<OrderId>,
    pub pickup_path: Vec<Coordinate>,
    pub delivery_path: Vec<Coordinate>,
    pub outcome: RunOutcome,
    /// execute 通知是否已被服务端接受
    pub executed: bool,
}

pub struct OrderOrchestrator {
    api: Arc<dyn WarehouseApi>,
    session: Arc<AgvSession>,
    animator: AgvAnimator,
    hub: StateHub,
    bounds: GridBounds,
    pickup_dwell: Duration,
}

fn display_id(id: Option<&OrderId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
}

fn format_dwell(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

impl OrderOrchestrator {
    pub fn new(
        api: Arc<dyn WarehouseApi>,
        session: Arc<AgvSession>,
        animator: AgvAnimator,
        hub: StateHub,
        bounds: GridBounds,
        pickup_dwell: Duration,
    ) -> Self {
        Self {
            api,
            session,
            animator,
            hub,
            bounds,
            pickup_dwell,
        }
    }

    pub fn session(&self) -> &Arc<AgvSession> {
        &self.session
    }

    /// 用户输入的取货点、送货点文本 → 完整订单流程
    pub async fn create_order(
        &self,
        pickup_text: &str,
        delivery_text: &str,
    ) -> Result<OrderReport, OrderError> {
        self.hub.clear_alert();

        let parsed = parse_coordinate(pickup_text, self.bounds)
            .and_then(|p| parse_coordinate(delivery_text, self.bounds).map(|d| (p, d)));
        let (pickup, delivery) = match parsed {
            Ok(pair) => pair,
            Err(e) => {
                let err = OrderError::from(e);
                tracing::debug!(pickup = pickup_text, delivery = delivery_text, "rejected coordinates");
                self.hub.alert(err.to_string());
                return Err(err);
            }
        };

        let guard = match self.session.try_begin() {
            Ok(guard) => guard,
            Err(e) => {
                self.hub.alert(e.to_string());
                return Err(e);
            }
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("order_run", %run_id, %pickup, %delivery);
        self.run(&guard, pickup, delivery).instrument(span).await
    }

    async fn run(
        &self,
        guard: &OrderGuard,
        pickup: Coordinate,
        delivery: Coordinate,
    ) -> Result<OrderReport, OrderError> {
        let token = guard.token();

        self.hub.log("Requesting plan to pickup...");
        let start = self.session.position();
        let pickup_path = self.plan_leg(start, pickup, Leg::Pickup).await?;
        let delivery_path = self.plan_leg(pickup, delivery, Leg::Delivery).await?;

        if token.is_cancelled() {
            self.hub.log("Order cancelled before creation");
            return Err(OrderError::Cancelled);
        }

        let order_id = match self.api.create_order(pickup, delivery).await {
            Ok(id) => id,
            Err(e) => {
                // 请求可能已在服务端生效，列表以服务端为准
                self.hub.log(format!("Order creation failed: {}", e));
                self.refresh_orders().await;
                return Err(e.into());
            }
        };
        self.hub
            .log(format!("Order created (id: {})", display_id(order_id.as_ref())));

        guard.set_phase(OrderPhase::Animating);
        let outcome = self.drive(&pickup_path, &delivery_path, guard).await;

        let mut executed = false;
        match outcome {
            RunOutcome::Delivered => {
                if let Some(id) = &order_id {
                    match self.api.execute(&delivery_path, id).await {
                        Ok(()) => executed = true,
                        Err(e) => {
                            tracing::warn!(order_id = %id, error = %e, "execute notification failed");
                            self.hub.log(format!("Execute failed for order {}: {}", id, e));
                        }
                    }
                }
            }
            RunOutcome::Cancelled => {
                self.hub.log(format!(
                    "Order {} cancelled; AGV stopped at {}",
                    display_id(order_id.as_ref()),
                    self.session.position()
                ));
            }
        }

        self.refresh_orders().await;

        Ok(OrderReport {
            pickup,
            delivery,
            order_id,
            pickup_path,
            delivery_path,
            outcome,
            executed,
        })
    }

    async fn plan_leg(
        &self,
        from: Coordinate,
        to: Coordinate,
        leg: Leg,
    ) -> Result<Vec<Coordinate>, OrderError> {
        if !self.bounds.contains(from) {
            let err = OrderError::OffGrid { leg, at: from };
            self.hub.log(err.to_string());
            return Err(err);
        }
        match self.api.plan(from, to).await {
            Ok(path) if path.is_empty() => {
                let err = OrderError::NoRoute(leg);
                self.hub.log(err.to_string());
                Err(err)
            }
            Ok(path) => {
                if let Some(&at) = path.iter().find(|&&c| !self.bounds.contains(c)) {
                    tracing::warn!(%leg, %at, "planner returned an off-grid cell");
                    let err = OrderError::OffGrid { leg, at };
                    self.hub.log(err.to_string());
                    return Err(err);
                }
                tracing::debug!(%leg, len = path.len(), "path planned");
                Ok(path)
            }
            Err(e) => {
                self.hub.log(format!("Plan to {} failed: {}", leg, e));
                Err(e.into())
            }
        }
    }

    /// 取货段动画 → 停留 → 送货段动画；任一阶段被取消即停止
    async fn drive(
        &self,
        pickup_path: &[Coordinate],
        delivery_path: &[Coordinate],
        guard: &OrderGuard,
    ) -> RunOutcome {
        let token = guard.token();

        let outcome = self.animator.animate(&self.session, pickup_path, token).await;
        if outcome.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        self.hub.log(format!(
            "Reached pickup. Simulating pickup ({})",
            format_dwell(self.pickup_dwell)
        ));
        if !pause(self.pickup_dwell, token).await {
            return RunOutcome::Cancelled;
        }

        match self.animator.animate(&self.session, delivery_path, token).await {
            AnimationOutcome::Completed { .. } => {
                self.hub.log("Reached delivery. Marking order complete (frontend)");
                RunOutcome::Delivered
            }
            AnimationOutcome::Cancelled { .. } => RunOutcome::Cancelled,
        }
    }

    /// 重新拉取订单列表并整体替换
    pub async fn refresh_orders(&self) {
        let view = OrdersView::load(self.api.as_ref()).await;
        if view.state().is_unavailable() {
            self.hub.log("Orders unavailable");
        }
        self.hub.update(|s| s.orders = view);
    }

    /// 取消当前订单运行
    pub fn cancel(&self) -> bool {
        let cancelled = self.session.cancel_current();
        if cancelled {
            self.hub.log("Cancelling current order...");
        } else {
            self.hub.log("No order in progress");
        }
        cancelled
    }

    /// AGV 回到起点并刷新订单列表；订单运行中时拒绝
    pub async fn reset(&self) -> Result<(), OrderError> {
        if let Err(e) = self.session.reset() {
            self.hub.alert(e.to_string());
            return Err(e);
        }
        self.refresh_orders().await;
        self.hub.log("Reset AGV position");
        Ok(())
    }
}
