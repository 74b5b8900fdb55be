//! AGV 动画：按固定间隔沿路径逐格移动
//!
//! 路径第一个元素是起点，不做动画；之后每一跳：先检查取消、更新位置、通知观察者，再等待 step_delay。
//! 等待期间收到取消立即返回。同一会话同一时刻只有一个动画（由 AgvSession 的 guard 保证）。

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::AgvSession;
use crate::grid::Coordinate;

/// 每一跳的回调（测试中用于记录轨迹）
pub trait HopObserver: Send + Sync {
    fn on_hop(&self, index: usize, at: Coordinate);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationOutcome {
    Completed { hops: usize },
    Cancelled { hops_applied: usize },
}

impl AnimationOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnimationOutcome::Cancelled { .. })
    }
}

#[derive(Clone)]
pub struct AgvAnimator {
    step_delay: Duration,
    observer: Option<Arc<dyn HopObserver>>,
}

impl AgvAnimator {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            step_delay,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HopObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub async fn animate(
        &self,
        session: &AgvSession,
        path: &[Coordinate],
        cancel: &CancellationToken,
    ) -> AnimationOutcome {
        let mut applied = 0;
        for (index, &hop) in path.iter().enumerate().skip(1) {
            if cancel.is_cancelled() {
                return AnimationOutcome::Cancelled {
                    hops_applied: applied,
                };
            }
            session.set_position(hop);
            applied += 1;
            if let Some(observer) = &self.observer {
                observer.on_hop(index, hop);
            }
            tracing::debug!(hop = index, row = hop.row, col = hop.col, "agv moved");

            if !pause(self.step_delay, cancel).await {
                return AnimationOutcome::Cancelled {
                    hops_applied: applied,
                };
            }
        }
        AnimationOutcome::Completed { hops: applied }
    }
}

/// 可取消的等待；被取消时返回 false
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
