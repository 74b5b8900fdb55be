//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AGV__*` 覆盖（双下划线表示嵌套，如 `AGV__SERVER__BASE_URL=http://10.0.0.5:5000`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::grid::{Coordinate, GridBounds};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub grid: GridSection,
    pub agv: AgvSection,
    pub dashboard: DashboardSection,
    pub logging: LoggingSection,
}

/// [server] 段：后端地址与请求超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// http（默认）或 mock（离线演示后端）
    pub backend: String,
    pub base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// [grid] 段：网格尺寸，坐标输入按此校验
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridSection {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self { rows: 9, cols: 9 }
    }
}

/// [agv] 段：起点、每步动画间隔、取货停留时长
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgvSection {
    pub start_row: u32,
    pub start_col: u32,
    pub step_delay_ms: u64,
    pub pickup_dwell_ms: u64,
}

impl Default for AgvSection {
    fn default() -> Self {
        Self {
            start_row: 8,
            start_col: 0,
            step_delay_ms: 250,
            pickup_dwell_ms: 1000,
        }
    }
}

/// [dashboard] 段：KPI 轮询周期、状态日志保留条数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    pub kpi_poll_secs: u64,
    pub status_log_capacity: usize,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            kpi_poll_secs: 5,
            status_log_capacity: 200,
        }
    }
}

/// [logging] 段：TUI 模式下日志写入文件，避免刷花屏幕
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub file: PathBuf,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("agvdash.log"),
        }
    }
}

impl AppConfig {
    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.grid.rows, self.grid.cols)
    }

    pub fn agv_start(&self) -> Coordinate {
        Coordinate::new(self.agv.start_row, self.agv.start_col)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.agv.step_delay_ms)
    }

    pub fn pickup_dwell(&self) -> Duration {
        Duration::from_millis(self.agv.pickup_dwell_ms)
    }

    pub fn kpi_poll_interval(&self) -> Duration {
        // interval 不接受 0
        Duration::from_secs(self.dashboard.kpi_poll_secs.max(1))
    }
}

/// 从 config 目录加载配置，环境变量 AGV__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 AGV__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AGV")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let cfg: AppConfig = c.try_deserialize()?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &AppConfig) -> Result<(), config::ConfigError> {
    if cfg.grid.rows == 0 || cfg.grid.cols == 0 {
        return Err(config::ConfigError::Message(
            "grid.rows and grid.cols must be positive".to_string(),
        ));
    }
    if !cfg.bounds().contains(cfg.agv_start()) {
        return Err(config::ConfigError::Message(format!(
            "agv start ({}) is outside the {}x{} grid",
            cfg.agv_start(),
            cfg.grid.rows,
            cfg.grid.cols
        )));
    }
    Ok(())
}
