//! 核心编排层：错误、状态投影、状态日志、AGV 会话、订单编排、主控循环

pub mod error;
pub mod order;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod status;

pub use error::{Leg, OrderError};
pub use order::{OrderOrchestrator, OrderReport, RunOutcome};
pub use orchestrator::{create_dashboard, Command, Dashboard};
pub use session::{AgvSession, OrderGuard};
pub use state::{DashboardState, OrderPhase, StateHub};
pub use status::{StatusEntry, StatusLog};
