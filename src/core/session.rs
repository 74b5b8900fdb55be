//! AGV 会话：位置、订单阶段与取消
//!
//! 整个界面会话只有一个 AgvSession。它是 AGV 模拟状态的唯一持有者：
//! try_begin 在 Idle 时才发放 OrderGuard（否则 Busy），guard 释放时回到 Idle；
//! 每次订单运行拿到根 token 的子 token，Cancel 只取消当前运行，shutdown 取消全部。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::core::{OrderError, OrderPhase, StateHub};
use crate::grid::Coordinate;

#[derive(Debug)]
struct AgvState {
    position: Coordinate,
    phase: OrderPhase,
    run: Option<CancellationToken>,
}

/// 会话级 AGV 状态，所有修改同步发布到 StateHub
pub struct AgvSession {
    state: Mutex<AgvState>,
    start: Coordinate,
    root: CancellationToken,
    hub: StateHub,
}

impl AgvSession {
    pub fn new(start: Coordinate, hub: StateHub) -> Self {
        Self {
            state: Mutex::new(AgvState {
                position: start,
                phase: OrderPhase::Idle,
                run: None,
            }),
            start,
            root: CancellationToken::new(),
            hub,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AgvState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn position(&self) -> Coordinate {
        self.lock().position
    }

    pub fn phase(&self) -> OrderPhase {
        self.lock().phase
    }

    pub fn set_position(&self, at: Coordinate) {
        self.lock().position = at;
        self.hub.update(|s| s.agv = at);
    }

    fn set_phase(&self, phase: OrderPhase) {
        self.lock().phase = phase;
        self.hub.update(|s| s.phase = phase);
    }

    /// 进入 Planning 并返回本次运行的 guard；非 Idle 或已关闭时返回 Busy
    pub fn try_begin(self: &Arc<Self>) -> Result<OrderGuard, OrderError> {
        let token = {
            let mut state = self.lock();
            if state.phase != OrderPhase::Idle || self.root.is_cancelled() {
                return Err(OrderError::Busy);
            }
            let token = self.root.child_token();
            state.phase = OrderPhase::Planning;
            state.run = Some(token.clone());
            token
        };
        self.hub.update(|s| s.phase = OrderPhase::Planning);
        Ok(OrderGuard {
            session: Arc::clone(self),
            token,
        })
    }

    /// 取消当前订单运行；没有运行中的订单时返回 false
    pub fn cancel_current(&self) -> bool {
        match &self.lock().run {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// AGV 回到起点；订单运行中时拒绝
    pub fn reset(&self) -> Result<Coordinate, OrderError> {
        {
            let mut state = self.lock();
            if state.phase != OrderPhase::Idle {
                return Err(OrderError::Busy);
            }
            state.position = self.start;
        }
        let start = self.start;
        self.hub.update(|s| s.agv = start);
        Ok(start)
    }

    /// 关闭会话：取消所有运行并拒绝后续订单
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.root.clone()
    }
}

/// 一次订单运行的占用凭证；drop 时会话回到 Idle
pub struct OrderGuard {
    session: Arc<AgvSession>,
    token: CancellationToken,
}

impl OrderGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn set_phase(&self, phase: OrderPhase) {
        self.session.set_phase(phase);
    }
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        self.session.lock().run = None;
        self.session.set_phase(OrderPhase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DashboardState;
    use crate::grid::GridBounds;

    fn session() -> Arc<AgvSession> {
        let (hub, _rx) = StateHub::new(DashboardState::new(
            GridBounds::default(),
            Coordinate::new(8, 0),
            10,
        ));
        Arc::new(AgvSession::new(Coordinate::new(8, 0), hub))
    }

    #[test]
    fn test_second_begin_is_busy() {
        let s = session();
        let guard = s.try_begin().unwrap();
        assert_eq!(s.phase(), OrderPhase::Planning);
        assert!(matches!(s.try_begin(), Err(OrderError::Busy)));

        drop(guard);
        assert_eq!(s.phase(), OrderPhase::Idle);
        assert!(s.try_begin().is_ok());
    }

    #[test]
    fn test_cancel_only_hits_current_run() {
        let s = session();
        assert!(!s.cancel_current());

        let guard = s.try_begin().unwrap();
        let token = guard.token().clone();
        assert!(s.cancel_current());
        assert!(token.is_cancelled());
        drop(guard);

        let next = s.try_begin().unwrap();
        assert!(!next.token().is_cancelled());
    }

    #[test]
    fn test_reset_rejected_while_running() {
        let s = session();
        s.set_position(Coordinate::new(1, 1));
        let guard = s.try_begin().unwrap();
        assert!(matches!(s.reset(), Err(OrderError::Busy)));
        drop(guard);
        assert_eq!(s.reset().unwrap(), Coordinate::new(8, 0));
        assert_eq!(s.position(), Coordinate::new(8, 0));
    }

    #[test]
    fn test_shutdown_refuses_new_orders() {
        let s = session();
        s.shutdown();
        assert!(matches!(s.try_begin(), Err(OrderError::Busy)));
    }
}
