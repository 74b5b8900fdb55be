//! AGV Dash - 仓库 AGV 仪表盘与订单模拟客户端
//!
//! 模块划分：
//! - **animator**: 沿路径逐格推进 AGV，可取消
//! - **api**: 仓库后端抽象（WarehouseApi）、HTTP 客户端、Mock 后端与线上数据结构
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 订单编排、AGV 会话、状态投影、状态日志、主控循环
//! - **grid**: 坐标解析与网格数据
//! - **observability**: tracing 日志初始化
//! - **ui**: Ratatui TUI 界面
//! - **views**: 订单列表、KPI、库存三个只读视图及库存表单

pub mod animator;
pub mod api;
pub mod config;
pub mod core;
pub mod grid;
pub mod observability;
pub mod ui;
pub mod views;
