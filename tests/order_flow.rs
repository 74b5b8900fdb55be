//! 订单流程集成测试（Mock 后端）

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use agvdash::animator::{AgvAnimator, HopObserver};
    use agvdash::api::{ApiCall, MockWarehouseApi, OrderId};
    use agvdash::config::AppConfig;
    use agvdash::core::{Dashboard, OrderError, OrderPhase, RunOutcome};
    use agvdash::grid::Coordinate;

    #[derive(Default)]
    struct Trail(Mutex<Vec<Coordinate>>);

    impl HopObserver for Trail {
        fn on_hop(&self, _index: usize, at: Coordinate) {
            self.0.lock().unwrap().push(at);
        }
    }

    fn c(row: u32, col: u32) -> Coordinate {
        Coordinate::new(row, col)
    }

    fn path(cells: &[(u32, u32)]) -> Vec<Coordinate> {
        cells.iter().map(|&(r, col)| c(r, col)).collect()
    }

    fn config(step_ms: u64) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.agv.step_delay_ms = step_ms;
        cfg.agv.pickup_dwell_ms = 1;
        cfg
    }

    fn warehouse() -> MockWarehouseApi {
        MockWarehouseApi::new()
            .with_route(c(8, 0), c(3, 2), path(&[(8, 0), (7, 0), (6, 1), (3, 2)]))
            .with_route(c(3, 2), c(1, 1), path(&[(3, 2), (2, 2), (1, 1)]))
    }

    fn dashboard(api: &Arc<MockWarehouseApi>, step_ms: u64) -> (Dashboard, Arc<Trail>, tokio::sync::watch::Receiver<agvdash::core::DashboardState>) {
        let cfg = config(step_ms);
        let trail = Arc::new(Trail::default());
        let animator = AgvAnimator::new(cfg.step_delay()).with_observer(trail.clone());
        let (dashboard, rx) = Dashboard::with_animator(&cfg, api.clone(), animator);
        (dashboard, trail, rx)
    }

    #[tokio::test]
    async fn test_order_drives_both_legs_and_executes() {
        let api = Arc::new(warehouse());
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let report = dashboard.orders().create_order("3,2", "1,1").await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Delivered);
        assert_eq!(report.order_id, Some(OrderId::Number(1)));
        assert!(report.executed);
        assert_eq!(
            *trail.0.lock().unwrap(),
            path(&[(7, 0), (6, 1), (3, 2), (2, 2), (1, 1)])
        );
        assert_eq!(
            api.count_calls(|call| matches!(call, ApiCall::Execute { order_id: OrderId::Number(1), path } if path.len() == 3)),
            1
        );

        let state = rx.borrow().clone();
        assert_eq!(state.agv, c(1, 1));
        assert_eq!(state.phase, OrderPhase::Idle);
        assert!(state.status.contains("Order created (id: 1)"));
        assert!(state.status.contains("Reached pickup. Simulating pickup (1ms)"));
        assert!(state.status.contains("Reached delivery. Marking order complete (frontend)"));
        assert_eq!(state.orders.rows(), api.server_orders().as_slice());
        assert_eq!(state.orders.rows()[0].status.as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn test_out_of_bounds_input_makes_no_calls() {
        let api = Arc::new(warehouse());
        let (dashboard, _, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("15,0", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::InvalidInput(_)));
        assert!(api.calls().is_empty());
        assert_eq!(rx.borrow().alert.as_deref(), Some("Enter valid coords like 3,2"));
        assert_eq!(rx.borrow().agv, c(8, 0));
    }

    #[tokio::test]
    async fn test_unreachable_pickup_creates_nothing() {
        let api = Arc::new(MockWarehouseApi::new().with_route(c(8, 0), c(3, 2), Vec::new()));
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::NoRoute(_)));
        assert!(rx.borrow().status.contains("No path to pickup"));
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::CreateOrder { .. })), 0);
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::Plan { .. })), 1);
        assert!(trail.0.lock().unwrap().is_empty());
        assert_eq!(rx.borrow().phase, OrderPhase::Idle);
    }

    #[tokio::test]
    async fn test_unreachable_delivery_creates_nothing() {
        let api = Arc::new(
            MockWarehouseApi::new()
                .with_route(c(8, 0), c(3, 2), path(&[(8, 0), (7, 0), (6, 1), (3, 2)]))
                .with_route(c(3, 2), c(1, 1), Vec::new()),
        );
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::NoRoute(_)));
        assert!(rx.borrow().status.contains("No path to delivery"));
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::CreateOrder { .. })), 0);
        assert!(trail.0.lock().unwrap().is_empty());
        assert_eq!(rx.borrow().agv, c(8, 0));
    }

    #[tokio::test]
    async fn test_order_id_zero_still_executes() {
        let api = Arc::new(warehouse().with_next_order_id(0));
        let (dashboard, _, _) = dashboard(&api, 1);

        let report = dashboard.orders().create_order("3,2", "1,1").await.unwrap();

        assert_eq!(report.order_id, Some(OrderId::Number(0)));
        assert!(report.executed);
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::Execute { order_id: OrderId::Number(0), .. })), 1);
    }

    #[tokio::test]
    async fn test_missing_order_id_skips_execute() {
        let api = Arc::new(warehouse().without_order_ids());
        let (dashboard, _, rx) = dashboard(&api, 1);

        let report = dashboard.orders().create_order("3,2", "1,1").await.unwrap();

        assert_eq!(report.order_id, None);
        assert!(!report.executed);
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::Execute { .. })), 0);
        assert!(rx.borrow().status.contains("Order created (id: ?)"));
        assert_eq!(rx.borrow().agv, c(1, 1));
        // 列表仍然刷新，订单保持 pending
        assert_eq!(rx.borrow().orders.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_second_order_while_running_is_busy() {
        let api = Arc::new(warehouse());
        let (dashboard, _, mut rx) = dashboard(&api, 30);
        let orders = dashboard.orders().clone();

        let first = tokio::spawn({
            let orders = orders.clone();
            async move { orders.create_order("3,2", "1,1").await }
        });
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.phase == OrderPhase::Animating),
        )
        .await
        .unwrap()
        .unwrap();

        let err = orders.create_order("1,1", "3,2").await.unwrap_err();
        assert!(matches!(err, OrderError::Busy));
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::CreateOrder { .. })), 1);

        assert!(orders.cancel());
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_mid_route_skips_execute_and_refreshes() {
        let api = Arc::new(warehouse());
        let (dashboard, trail, mut rx) = dashboard(&api, 30);
        let orders = dashboard.orders().clone();

        let run = tokio::spawn({
            let orders = orders.clone();
            async move { orders.create_order("3,2", "1,1").await }
        });
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.agv == c(7, 0)))
            .await
            .unwrap()
            .unwrap();
        orders.cancel();

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert!(!report.executed);
        assert_eq!(api.count_calls(|call| matches!(call, ApiCall::Execute { .. })), 0);
        assert!(trail.0.lock().unwrap().len() < 5);

        let state = rx.borrow().clone();
        assert_eq!(state.phase, OrderPhase::Idle);
        assert_eq!(state.orders.rows().len(), 1);
        assert_eq!(state.orders.rows()[0].status.as_deref(), Some("pending"));

        // 取消后可以复位并重新下单
        orders.reset().await.unwrap();
        assert_eq!(rx.borrow().agv, c(8, 0));
    }

    #[tokio::test]
    async fn test_failed_refresh_marks_orders_unavailable() {
        let api = Arc::new(warehouse());
        let (dashboard, _, rx) = dashboard(&api, 1);
        dashboard.init().await;
        assert!(!rx.borrow().orders.state().is_unavailable());

        api.set_failing(true);
        dashboard.orders().refresh_orders().await;

        assert!(rx.borrow().orders.state().is_unavailable());
        assert!(rx.borrow().status.contains("Orders unavailable"));
    }

    fn is_plan(call: &ApiCall) -> bool {
        matches!(call, ApiCall::Plan { .. })
    }

    fn is_create(call: &ApiCall) -> bool {
        matches!(call, ApiCall::CreateOrder { .. })
    }

    #[tokio::test]
    async fn test_off_grid_hop_aborts_before_order() {
        let api = Arc::new(
            MockWarehouseApi::new()
                .with_route(c(8, 0), c(3, 2), path(&[(8, 0), (20, 20), (3, 2)]))
                .with_route(c(3, 2), c(1, 1), path(&[(3, 2), (2, 2), (1, 1)])),
        );
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::OffGrid { at, .. } if at == c(20, 20)));
        assert!(rx.borrow().status.contains("Path to pickup leaves the grid at 20,20"));
        assert_eq!(api.count_calls(is_create), 0);
        assert_eq!(api.count_calls(is_plan), 1);
        assert!(trail.0.lock().unwrap().is_empty());
        assert_eq!(rx.borrow().agv, c(8, 0));
    }

    #[tokio::test]
    async fn test_off_grid_delivery_leg_never_moves_agv_off_grid() {
        let api = Arc::new(
            MockWarehouseApi::new()
                .with_route(c(8, 0), c(3, 2), path(&[(8, 0), (7, 0), (6, 1), (3, 2)]))
                .with_route(c(3, 2), c(1, 1), path(&[(3, 2), (40, 40)])),
        );
        let (dashboard, _, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();
        assert!(matches!(err, OrderError::OffGrid { at, .. } if at == c(40, 40)));
        assert_eq!(api.count_calls(is_create), 0);
        assert_eq!(rx.borrow().agv, c(8, 0));

        // 下一单的规划起点仍在网格内
        let _ = dashboard.orders().create_order("3,2", "1,1").await;
        let bounds = agvdash::grid::GridBounds::new(9, 9);
        for call in api.calls() {
            if let ApiCall::Plan { start, goal } = call {
                assert!(bounds.contains(start) && bounds.contains(goal));
            }
        }
    }

    #[tokio::test]
    async fn test_plan_transport_failure_aborts_without_order() {
        let api = Arc::new(warehouse());
        api.set_failing(true);
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::Api(_)));
        assert!(rx
            .borrow()
            .status
            .contains("Plan to pickup failed: Request failed: mock backend offline"));
        assert_eq!(api.count_calls(is_create), 0);
        assert!(trail.0.lock().unwrap().is_empty());
        assert_eq!(rx.borrow().phase, OrderPhase::Idle);
    }

    #[tokio::test]
    async fn test_delivery_plan_failure_aborts_without_order() {
        let api = Arc::new(warehouse().fail_when(|call| {
            matches!(call, ApiCall::Plan { start, .. } if *start == Coordinate::new(3, 2))
        }));
        let (dashboard, _, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::Api(_)));
        assert!(rx
            .borrow()
            .status
            .contains("Plan to delivery failed: Request failed: mock backend offline"));
        assert_eq!(api.count_calls(is_plan), 2);
        assert_eq!(api.count_calls(is_create), 0);
    }

    #[tokio::test]
    async fn test_execute_failure_still_refreshes_orders() {
        let api = Arc::new(warehouse().fail_when(|call| matches!(call, ApiCall::Execute { .. })));
        let (dashboard, _, rx) = dashboard(&api, 1);

        let report = dashboard.orders().create_order("3,2", "1,1").await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Delivered);
        assert!(!report.executed);
        let state = rx.borrow().clone();
        assert!(state
            .status
            .contains("Execute failed for order 1: Request failed: mock backend offline"));
        assert_eq!(state.agv, c(1, 1));
        assert_eq!(state.orders.rows().len(), 1);
        assert_eq!(state.orders.rows()[0].status.as_deref(), Some("pending"));

        let calls = api.calls();
        let execute_at = calls
            .iter()
            .position(|call| matches!(call, ApiCall::Execute { .. }))
            .unwrap();
        assert!(calls[execute_at + 1..].contains(&ApiCall::Orders));
    }

    #[tokio::test]
    async fn test_text_order_id_runs_to_completion() {
        let api = Arc::new(warehouse().with_text_order_ids("A-"));
        let (dashboard, _, rx) = dashboard(&api, 1);

        let report = dashboard.orders().create_order("3,2", "1,1").await.unwrap();

        assert_eq!(report.order_id, Some(OrderId::from("A-1")));
        assert!(report.executed);
        assert!(rx.borrow().status.contains("Order created (id: A-1)"));
        assert_eq!(
            api.count_calls(|call| matches!(call, ApiCall::Execute { order_id: OrderId::Text(id), .. } if id == "A-1")),
            1
        );
        assert_eq!(rx.borrow().orders.rows()[0].status.as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn test_create_failure_refreshes_orders() {
        let api = Arc::new(warehouse().fail_when(is_create));
        let (dashboard, trail, rx) = dashboard(&api, 1);

        let err = dashboard.orders().create_order("3,2", "1,1").await.unwrap_err();

        assert!(matches!(err, OrderError::Api(_)));
        assert!(rx
            .borrow()
            .status
            .contains("Order creation failed: Request failed: mock backend offline"));
        assert_eq!(api.count_calls(|call| *call == ApiCall::Orders), 1);
        assert!(!rx.borrow().orders.state().is_unavailable());
        assert!(trail.0.lock().unwrap().is_empty());
    }
}
