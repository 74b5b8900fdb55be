//! HTTP 后端客户端
//!
//! 通过 reqwest 调用仓储 REST 接口（base_url 可配置）；每个请求带超时。
//! 非 2xx 响应若带 `{error}` 则转为 ApiError::Rejected，原样交给界面展示；不做重试。

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::types::{
    AgvStatus, CreateOrderRequest, CreateOrderResponse, ErrorBody, ExecuteRequest, InventoryItem,
    NewInventoryItem, OrderId, OrderRecord, PlanRequest, PlanResponse, QuantityUpdate,
};
use crate::api::{ApiError, WarehouseApi};
use crate::grid::{Coordinate, Grid};

/// HTTP 客户端：持有 reqwest Client 与去掉末尾斜杠的 base_url
pub struct HttpWarehouseClient {
    client: Client,
    base_url: String,
}

impl HttpWarehouseClient {
    /// 构建失败（如 TLS 后端初始化失败）时返回 Transport 错误，不退回到无超时的默认客户端
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("agvdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("http client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut req = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        tracing::debug!(%method, path, "warehouse request");
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send::<()>(Method::GET, path, None).await?;
        decode(resp).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(method, path, Some(body)).await?;
        decode(resp).await
    }
}

/// 非 2xx：优先取 `{error}` 字段，否则只报状态码
async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => Err(ApiError::Rejected(body.error)),
        Err(_) => Err(ApiError::Status(status.as_u16())),
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl WarehouseApi for HttpWarehouseClient {
    async fn grid(&self) -> Result<Grid, ApiError> {
        self.get_json("/api/grid").await
    }

    async fn plan(
        &self,
        start: Coordinate,
        goal: Coordinate,
    ) -> Result<Vec<Coordinate>, ApiError> {
        let resp: PlanResponse = self
            .send_json(Method::POST, "/api/plan", &PlanRequest { start, goal })
            .await?;
        Ok(resp.path.unwrap_or_default())
    }

    async fn create_order(
        &self,
        pickup: Coordinate,
        delivery: Coordinate,
    ) -> Result<Option<OrderId>, ApiError> {
        let resp: CreateOrderResponse = self
            .send_json(
                Method::POST,
                "/api/orders",
                &CreateOrderRequest { pickup, delivery },
            )
            .await?;
        Ok(resp.order_id)
    }

    async fn execute(&self, path: &[Coordinate], order_id: &OrderId) -> Result<(), ApiError> {
        let body = ExecuteRequest {
            path: path.to_vec(),
            order_id: order_id.clone(),
        };
        self.send(Method::POST, "/api/execute", Some(&body)).await?;
        Ok(())
    }

    async fn orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        self.get_json("/api/orders").await
    }

    async fn agv_status(&self) -> Result<AgvStatus, ApiError> {
        self.get_json("/api/agv").await
    }

    async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
        self.get_json("/api/inventory").await
    }

    async fn add_inventory(&self, item: &NewInventoryItem) -> Result<(), ApiError> {
        self.send(Method::POST, "/api/inventory", Some(item)).await?;
        Ok(())
    }

    async fn update_quantity(&self, id: u64, quantity: i64) -> Result<(), ApiError> {
        let path = format!("/api/inventory/{}", id);
        self.send(Method::PUT, &path, Some(&QuantityUpdate { quantity }))
            .await?;
        Ok(())
    }
}
