//! 后端层：仓储 API 抽象与实现（HTTP / Mock）

pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

use std::sync::Arc;

use crate::config::AppConfig;

pub use http::HttpWarehouseClient;
pub use mock::{ApiCall, MockWarehouseApi};
pub use traits::{ApiError, WarehouseApi};
pub use types::{AgvStatus, InventoryItem, NewInventoryItem, OrderId, OrderRecord};

/// 根据配置选择后端：`server.backend = "mock"` 时用离线演示后端，否则走 HTTP
pub fn create_api_from_config(cfg: &AppConfig) -> Result<Arc<dyn WarehouseApi>, ApiError> {
    match cfg.server.backend.to_lowercase().as_str() {
        "mock" | "demo" => {
            tracing::warn!("Using mock warehouse backend (offline demo)");
            Ok(Arc::new(MockWarehouseApi::demo()))
        }
        _ => {
            tracing::info!("Using warehouse backend at {}", cfg.server.base_url);
            let client =
                HttpWarehouseClient::new(&cfg.server.base_url, cfg.server.request_timeout_secs)?;
            Ok(Arc::new(client))
        }
    }
}
