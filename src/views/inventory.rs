//! 库存表：列表、新增货品、修改数量
//!
//! 新增前在客户端检查必填项与整数字段；服务端拒绝（如货位已被占用）时原样展示其 error。

use thiserror::Error;

use crate::api::{ApiError, InventoryItem, NewInventoryItem, WarehouseApi};
use crate::views::ViewState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryView {
    state: ViewState<Vec<InventoryItem>>,
}

impl InventoryView {
    pub async fn load(api: &dyn WarehouseApi) -> Self {
        let state = match api.inventory().await {
            Ok(items) => ViewState::Ready(items),
            Err(e) => {
                tracing::warn!(error = %e, "inventory load failed");
                ViewState::Unavailable
            }
        };
        Self { state }
    }

    pub fn state(&self) -> &ViewState<Vec<InventoryItem>> {
        &self.state
    }

    pub fn rows(&self) -> &[InventoryItem] {
        self.state.ready().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Please fill all fields!")]
    MissingFields,

    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),

    #[error("ERROR: {0}")]
    Api(#[from] ApiError),
}

/// 新增货品表单（原始文本）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryForm {
    pub product_name: String,
    pub quantity: String,
    pub zone: String,
    pub rack: String,
    pub row: String,
    pub col: String,
}

fn parse_int(text: &str, field: &'static str) -> Result<i64, InventoryError> {
    text.trim()
        .parse()
        .map_err(|_| InventoryError::NotAnInteger(field))
}

impl InventoryForm {
    pub fn validate(&self) -> Result<NewInventoryItem, InventoryError> {
        let fields = [
            &self.product_name,
            &self.quantity,
            &self.zone,
            &self.rack,
            &self.row,
            &self.col,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(InventoryError::MissingFields);
        }
        Ok(NewInventoryItem {
            product_name: self.product_name.trim().to_string(),
            quantity: parse_int(&self.quantity, "quantity")?,
            zone: self.zone.trim().to_string(),
            rack: self.rack.trim().to_string(),
            row_loc: parse_int(&self.row, "row_loc")?,
            col_loc: parse_int(&self.col, "col_loc")?,
        })
    }
}

/// 校验并提交新货品
pub async fn add_product(api: &dyn WarehouseApi, form: &InventoryForm) -> Result<(), InventoryError> {
    let item = form.validate()?;
    api.add_inventory(&item).await?;
    Ok(())
}

/// 修改某货品数量
pub async fn update_quantity(
    api: &dyn WarehouseApi,
    id: u64,
    quantity: &str,
) -> Result<(), InventoryError> {
    let quantity = parse_int(quantity, "quantity")?;
    api.update_quantity(id, quantity).await?;
    Ok(())
}
