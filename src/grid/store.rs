//! 网格存储：最近一次从 /api/grid 拉取的占用网格
//!
//! 每次刷新整体替换；拉取失败时显示 Unavailable。渲染只依赖这里的数据，不依赖终端。

use serde::Deserialize;

use crate::api::WarehouseApi;
use crate::grid::{Coordinate, GridBounds};
use crate::views::ViewState;

/// 格子类型：0 空闲、1 障碍、2 取货点、3 送货点；未知编码原样保留
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Free,
    Obstacle,
    Pickup,
    Delivery,
    Unknown(i64),
}

impl From<i64> for CellKind {
    fn from(code: i64) -> Self {
        match code {
            0 => CellKind::Free,
            1 => CellKind::Obstacle,
            2 => CellKind::Pickup,
            3 => CellKind::Delivery,
            other => CellKind::Unknown(other),
        }
    }
}

/// 服务端下发的二维网格（行可能不等长，按原样保存）
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Vec<i64>>")]
pub struct Grid {
    cells: Vec<Vec<CellKind>>,
}

impl From<Vec<Vec<i64>>> for Grid {
    fn from(raw: Vec<Vec<i64>>) -> Self {
        Self {
            cells: raw
                .into_iter()
                .map(|row| row.into_iter().map(CellKind::from).collect())
                .collect(),
        }
    }
}

impl Grid {
    /// 越出下发形状时返回 None
    pub fn cell(&self, c: Coordinate) -> Option<CellKind> {
        self.cells
            .get(c.row as usize)
            .and_then(|row| row.get(c.col as usize))
            .copied()
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// 网格视图：固定 bounds 下的最近快照
#[derive(Clone, Debug, PartialEq)]
pub struct GridStore {
    bounds: GridBounds,
    grid: ViewState<Grid>,
}

impl GridStore {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            grid: ViewState::Loading,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn state(&self) -> &ViewState<Grid> {
        &self.grid
    }

    pub fn replace(&mut self, grid: ViewState<Grid>) {
        if let ViewState::Ready(g) = &grid {
            if g.rows() != self.bounds.rows as usize || g.cols() != self.bounds.cols as usize {
                tracing::warn!(
                    rows = g.rows(),
                    cols = g.cols(),
                    "grid shape differs from configured {}x{}",
                    self.bounds.rows,
                    self.bounds.cols
                );
            }
        }
        self.grid = grid;
    }

    /// 按 bounds 取格子类型；未加载或超出下发形状的格子视为空闲
    pub fn kind_at(&self, c: Coordinate) -> CellKind {
        self.grid
            .ready()
            .and_then(|g| g.cell(c))
            .unwrap_or(CellKind::Free)
    }
}

/// 拉取网格；失败时返回 Unavailable 并记录
pub async fn fetch_grid(api: &dyn WarehouseApi) -> ViewState<Grid> {
    match api.grid().await {
        Ok(grid) => ViewState::Ready(grid),
        Err(e) => {
            tracing::warn!(error = %e, "grid load failed");
            ViewState::Unavailable
        }
    }
}
