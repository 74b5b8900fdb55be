//! 输入表单：取货点 / 送货点文本框、网格光标、库存命令行
//!
//! 网格上选中格子时先填取货点，取货点已有值再填送货点（与点击格子的行为一致）。

use crate::core::Command;
use crate::grid::{Coordinate, GridBounds};
use crate::views::InventoryForm;

/// 当前页签
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Orders,
    Inventory,
}

/// 订单页上的焦点
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Pickup,
    Delivery,
    Grid,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Pickup => Focus::Delivery,
            Focus::Delivery => Focus::Grid,
            Focus::Grid => Focus::Pickup,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Pickup => Focus::Grid,
            Focus::Delivery => Focus::Pickup,
            Focus::Grid => Focus::Delivery,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderForm {
    pub pickup: String,
    pub delivery: String,
    pub cursor: Coordinate,
}

impl OrderForm {
    pub fn new(cursor: Coordinate) -> Self {
        Self {
            pickup: String::new(),
            delivery: String::new(),
            cursor,
        }
    }

    /// 选中格子：填入第一个空的输入框；两个都有值时不变，返回 false
    pub fn fill_from_cell(&mut self, c: Coordinate) -> bool {
        if self.pickup.is_empty() {
            self.pickup = c.to_string();
        } else if self.delivery.is_empty() {
            self.delivery = c.to_string();
        } else {
            return false;
        }
        true
    }

    pub fn fill_from_cursor(&mut self) -> bool {
        self.fill_from_cell(self.cursor)
    }

    /// 光标移动，夹在网格内
    pub fn move_cursor(&mut self, d_row: i32, d_col: i32, bounds: GridBounds) {
        let clamp = |v: u32, d: i32, limit: u32| {
            (i64::from(v) + i64::from(d)).clamp(0, i64::from(limit.saturating_sub(1))) as u32
        };
        self.cursor = Coordinate::new(
            clamp(self.cursor.row, d_row, bounds.rows),
            clamp(self.cursor.col, d_col, bounds.cols),
        );
    }

    pub fn field_mut(&mut self, focus: Focus) -> Option<&mut String> {
        match focus {
            Focus::Pickup => Some(&mut self.pickup),
            Focus::Delivery => Some(&mut self.delivery),
            Focus::Grid => None,
        }
    }

    pub fn clear(&mut self) {
        self.pickup.clear();
        self.delivery.clear();
    }

    pub fn submit(&self) -> Command {
        Command::CreateOrder {
            pickup: self.pickup.clone(),
            delivery: self.delivery.clone(),
        }
    }
}

pub const INVENTORY_USAGE: &str = "add <name> <qty> <zone> <rack> <row> <col> | qty <id> <quantity>";

/// 库存命令行：`add <name…> <qty> <zone> <rack> <row> <col>` 或 `qty <id> <quantity>`
///
/// 货品名可以含空格，取除最后五项以外的部分。
pub fn parse_inventory_command(line: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.split_first() {
        Some((&"add", rest)) if rest.len() >= 6 => {
            let (name, tail) = rest.split_at(rest.len() - 5);
            Ok(Command::AddProduct(InventoryForm {
                product_name: name.join(" "),
                quantity: tail[0].to_string(),
                zone: tail[1].to_string(),
                rack: tail[2].to_string(),
                row: tail[3].to_string(),
                col: tail[4].to_string(),
            }))
        }
        Some((&"qty", [id, quantity])) => {
            let id = id
                .parse::<u64>()
                .map_err(|_| format!("invalid product id: {}", id))?;
            Ok(Command::UpdateQuantity {
                id,
                quantity: quantity.to_string(),
            })
        }
        _ => Err(format!("usage: {}", INVENTORY_USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_click_fills_pickup_then_delivery() {
        let mut form = OrderForm::new(Coordinate::new(8, 0));
        assert!(form.fill_from_cell(Coordinate::new(3, 2)));
        assert!(form.fill_from_cell(Coordinate::new(1, 1)));
        assert!(!form.fill_from_cell(Coordinate::new(0, 0)));
        assert_eq!(form.pickup, "3,2");
        assert_eq!(form.delivery, "1,1");
    }

    #[test]
    fn test_cursor_clamped_to_grid() {
        let bounds = GridBounds::new(9, 9);
        let mut form = OrderForm::new(Coordinate::new(8, 0));
        form.move_cursor(1, -1, bounds);
        assert_eq!(form.cursor, Coordinate::new(8, 0));
        form.move_cursor(-3, 20, bounds);
        assert_eq!(form.cursor, Coordinate::new(5, 8));
    }

    #[test]
    fn test_focus_cycle() {
        assert_eq!(Focus::Pickup.next().next().next(), Focus::Pickup);
        assert_eq!(Focus::Pickup.prev(), Focus::Grid);
    }

    #[test]
    fn test_parse_add_with_spaced_name() {
        match parse_inventory_command("add Steel Bolts 10 A R1 0 1") {
            Ok(Command::AddProduct(form)) => {
                assert_eq!(form.product_name, "Steel Bolts");
                assert_eq!(form.quantity, "10");
                assert_eq!(form.rack, "R1");
                assert_eq!(form.col, "1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_qty() {
        match parse_inventory_command("qty 4 25") {
            Ok(Command::UpdateQuantity { id, quantity }) => {
                assert_eq!(id, 4);
                assert_eq!(quantity, "25");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_inventory_command("qty x 25").is_err());
        assert!(parse_inventory_command("add Bolts 10").is_err());
        assert!(parse_inventory_command("").is_err());
    }
}
