//! 仓储后端的 JSON 结构（请求体与响应体）

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Coordinate;

/// 服务端分配的订单号，对客户端不透明：数字或字符串都原样保存、原样回传
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    Number(u64),
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Number(n) => write!(f, "{}", n),
            OrderId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        OrderId::Number(n)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        OrderId::Text(s.to_string())
    }
}

/// POST /api/plan 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanRequest {
    pub start: Coordinate,
    pub goal: Coordinate,
}

/// POST /api/plan 响应体；path 缺失或为空都表示「无路可走」
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub path: Option<Vec<Coordinate>>,
}

/// POST /api/orders 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub pickup: Coordinate,
    pub delivery: Coordinate,
}

/// POST /api/orders 响应体；服务端可能不返回 order_id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// POST /api/execute 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub path: Vec<Coordinate>,
    pub order_id: OrderId,
}

/// GET /api/orders 中的一行；status 由服务端定义，客户端不解释
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub pickup_r: i64,
    pub pickup_c: i64,
    pub delivery_r: i64,
    pub delivery_c: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// GET /api/agv；服务端同时回报自己记录的位置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgvStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<i64>,
}

/// GET /api/inventory 中的一行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: u64,
    pub product_name: String,
    pub quantity: i64,
    pub zone: String,
    pub rack: String,
    pub row_loc: i64,
    pub col_loc: i64,
}

/// POST /api/inventory 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub product_name: String,
    pub quantity: i64,
    pub zone: String,
    pub rack: String,
    pub row_loc: i64,
    pub col_loc: i64,
}

/// PUT /api/inventory/{id} 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

/// 非 2xx 响应中的 `{error}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_response_missing_path() {
        let resp: PlanResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.path.is_none());
        let resp: PlanResponse = serde_json::from_str(r#"{"path": [[8,0],[7,0]]}"#).unwrap();
        assert_eq!(
            resp.path.unwrap(),
            vec![Coordinate::new(8, 0), Coordinate::new(7, 0)]
        );
    }

    #[test]
    fn test_order_id_zero_is_present() {
        let resp: CreateOrderResponse =
            serde_json::from_str(r#"{"message": "created", "order_id": 0}"#).unwrap();
        assert_eq!(resp.order_id, Some(OrderId::Number(0)));
        let resp: CreateOrderResponse = serde_json::from_str(r#"{"order_id": null}"#).unwrap();
        assert_eq!(resp.order_id, None);
        let resp: CreateOrderResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.order_id, None);
    }

    #[test]
    fn test_string_order_id_round_trips_as_string() {
        let resp: CreateOrderResponse =
            serde_json::from_str(r#"{"order_id": "A-17"}"#).unwrap();
        let id = resp.order_id.unwrap();
        assert_eq!(id, OrderId::from("A-17"));
        assert_eq!(id.to_string(), "A-17");

        let body = ExecuteRequest {
            path: vec![Coordinate::new(1, 1)],
            order_id: id,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"path": [[1, 1]], "order_id": "A-17"})
        );
        assert_eq!(
            serde_json::to_value(ExecuteRequest { path: vec![], order_id: OrderId::Number(0) }).unwrap()["order_id"],
            serde_json::json!(0)
        );
    }

    #[test]
    fn test_order_record_from_server_row() {
        let row = r#"{"id": 4, "pickup_r": 3, "pickup_c": 2, "delivery_r": 1,
                      "delivery_c": 1, "status": "pending", "created_at": "2024-05-01 10:00:00"}"#;
        let rec: OrderRecord = serde_json::from_str(row).unwrap();
        assert_eq!(rec.id, OrderId::Number(4));
        assert_eq!(rec.status.as_deref(), Some("pending"));

        let row = r#"{"id": "WO-9", "pickup_r": 3, "pickup_c": 2, "delivery_r": 1, "delivery_c": 1}"#;
        let rec: OrderRecord = serde_json::from_str(row).unwrap();
        assert_eq!(rec.id, OrderId::from("WO-9"));
        assert_eq!(rec.status, None);
    }

    #[test]
    fn test_create_order_body_shape() {
        let body = CreateOrderRequest {
            pickup: Coordinate::new(3, 2),
            delivery: Coordinate::new(1, 1),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"pickup": [3, 2], "delivery": [1, 1]})
        );
    }
}
