//! 订单流程错误类型
//!
//! 每种失败只终止触发它的那一次操作：输入错误不发请求，规划失败不建订单，忙碌时拒绝新订单。

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::grid::{CoordError, Coordinate};

/// 订单的两段行程
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    /// AGV 当前位置 → 取货点
    Pickup,
    /// 取货点 → 送货点
    Delivery,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Pickup => f.write_str("pickup"),
            Leg::Delivery => f.write_str("delivery"),
        }
    }
}

/// 创建订单过程中可能出现的错误
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Enter valid coords like 3,2")]
    InvalidInput(#[from] CoordError),

    #[error("No path to {0}")]
    NoRoute(Leg),

    /// 规划起点或服务端返回的某一跳落在网格外
    #[error("Path to {leg} leaves the grid at {at}")]
    OffGrid { leg: Leg, at: Coordinate },

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("AGV busy: wait for the current order or cancel it")]
    Busy,

    #[error("Order run cancelled")]
    Cancelled,
}
