//! 网格坐标：`"row,col"` 文本解析与边界校验
//!
//! 解析是纯函数；订单流程在发出任何网络请求前，先用它校验取货点与送货点。
//! 线上格式为两元素 JSON 数组 `[r, c]`。

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 网格中的一个格子（行、列均从 0 开始）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Coordinate {
    pub row: u32,
    pub col: u32,
}

impl Coordinate {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl From<[u32; 2]> for Coordinate {
    fn from([row, col]: [u32; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Coordinate> for [u32; 2] {
    fn from(c: Coordinate) -> Self {
        [c.row, c.col]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// 网格尺寸（行数 × 列数），所有用户输入的坐标都必须落在其中
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    pub rows: u32,
    pub cols: u32,
}

impl GridBounds {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.row < self.rows && c.col < self.cols
    }

    /// 按行优先遍历所有格子
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Coordinate::new(r, c)))
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(9, 9)
    }
}

/// 坐标输入无效的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("expected \"row,col\", got {0} part(s)")]
    Format(usize),

    #[error("not an integer: {0:?}")]
    NotANumber(String),

    #[error("({row},{col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: u32,
        cols: u32,
    },
}

/// 将 `"r,c"` 解析为网格内坐标：恰好两段、十进制整数、在边界内
pub fn parse_coordinate(input: &str, bounds: GridBounds) -> Result<Coordinate, CoordError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(CoordError::Format(parts.len()));
    }

    let parse = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| CoordError::NotANumber(s.to_string()))
    };
    let row = parse(parts[0])?;
    let col = parse(parts[1])?;

    let in_range = |v: i64, limit: u32| v >= 0 && v < i64::from(limit);
    if !in_range(row, bounds.rows) || !in_range(col, bounds.cols) {
        return Err(CoordError::OutOfBounds {
            row,
            col,
            rows: bounds.rows,
            cols: bounds.cols,
        });
    }

    Ok(Coordinate::new(row as u32, col as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NINE: GridBounds = GridBounds::new(9, 9);

    #[test]
    fn test_parse_every_cell_in_bounds() {
        for c in NINE.cells() {
            let text = format!("{},{}", c.row, c.col);
            assert_eq!(parse_coordinate(&text, NINE), Ok(c));
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_coordinate(" 3 , 2 ", NINE), Ok(Coordinate::new(3, 2)));
    }

    #[test]
    fn test_wrong_token_count() {
        assert_eq!(parse_coordinate("", NINE), Err(CoordError::Format(1)));
        assert_eq!(parse_coordinate("3", NINE), Err(CoordError::Format(1)));
        assert_eq!(parse_coordinate("1,2,3", NINE), Err(CoordError::Format(3)));
    }

    #[test]
    fn test_non_numeric() {
        assert!(matches!(
            parse_coordinate("a,2", NINE),
            Err(CoordError::NotANumber(s)) if s == "a"
        ));
        assert!(matches!(
            parse_coordinate("3,", NINE),
            Err(CoordError::NotANumber(_))
        ));
        assert!(matches!(
            parse_coordinate("3.5,2", NINE),
            Err(CoordError::NotANumber(_))
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(matches!(
            parse_coordinate("15,0", NINE),
            Err(CoordError::OutOfBounds { row: 15, col: 0, .. })
        ));
        assert!(matches!(
            parse_coordinate("0,9", NINE),
            Err(CoordError::OutOfBounds { .. })
        ));
        assert!(matches!(
            parse_coordinate("-1,0", NINE),
            Err(CoordError::OutOfBounds { row: -1, .. })
        ));
    }

    #[test]
    fn test_wire_format_is_pair() {
        let c = Coordinate::new(8, 0);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[8,0]");
        let back: Coordinate = serde_json::from_str("[3,2]").unwrap();
        assert_eq!(back, Coordinate::new(3, 2));
    }
}
