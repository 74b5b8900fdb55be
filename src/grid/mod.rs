//! 网格层：坐标解析（coord）与占用网格快照（store）

pub mod coord;
pub mod store;

pub use coord::{parse_coordinate, CoordError, Coordinate, GridBounds};
pub use store::{fetch_grid, CellKind, Grid, GridStore};
