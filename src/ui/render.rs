//! 界面渲染
//!
//! 根据 DashboardState 与本地表单绘制：标题栏显示阶段与 KPI；订单页左侧网格（AGV 标记 A、光标高亮），
//! 右侧订单列表；库存页为库存表；底部为输入框（错误时红框）与状态日志。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::core::{DashboardState, OrderPhase};
use crate::grid::{CellKind, Coordinate, GridBounds};
use crate::ui::form::{Focus, OrderForm, Tab, INVENTORY_USAGE};
use crate::views::{format_order, ViewState};

/// 界面本地状态：页签、焦点、表单、库存命令行、本地错误
#[derive(Clone, Debug)]
pub struct ViewModel {
    pub tab: Tab,
    pub focus: Focus,
    pub form: OrderForm,
    pub inventory_input: String,
    pub local_error: Option<String>,
}

impl ViewModel {
    pub fn new(cursor: Coordinate) -> Self {
        Self {
            tab: Tab::Orders,
            focus: Focus::Pickup,
            form: OrderForm::new(cursor),
            inventory_input: String::new(),
            local_error: None,
        }
    }
}

fn phase_label(phase: OrderPhase) -> &'static str {
    match phase {
        OrderPhase::Idle => "空闲",
        OrderPhase::Planning => "规划中…",
        OrderPhase::Animating => "运行中…",
    }
}

/// 格子字符与颜色
pub fn cell_glyph(kind: CellKind) -> (char, Color) {
    match kind {
        CellKind::Obstacle => ('#', Color::DarkGray),
        CellKind::Pickup => ('P', Color::Cyan),
        CellKind::Delivery => ('D', Color::Magenta),
        CellKind::Free | CellKind::Unknown(_) => ('.', Color::Gray),
    }
}

/// 按配置尺寸逐行生成网格；AGV 所在格显示 A，光标格反色
pub fn grid_lines(state: &DashboardState, cursor: Option<Coordinate>) -> Vec<Line<'static>> {
    let bounds = state.grid.bounds();
    (0..bounds.rows)
        .map(|r| {
            let spans: Vec<Span<'static>> = (0..bounds.cols)
                .map(|c| {
                    let at = Coordinate::new(r, c);
                    let (ch, color) = if at == state.agv {
                        ('A', Color::Yellow)
                    } else {
                        cell_glyph(state.grid.kind_at(at))
                    };
                    let mut style = Style::default().fg(color);
                    if at == state.agv {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    if cursor == Some(at) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Span::styled(format!(" {} ", ch), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// 网格面板外框尺寸（宽, 高）：每格 3 列加边框，超出终端坐标范围时饱和
pub fn grid_panel_size(bounds: GridBounds) -> (u16, u16) {
    let clamp = |n: u32| u16::try_from(n).unwrap_or(u16::MAX);
    (
        clamp(bounds.cols).saturating_mul(3).saturating_add(2),
        clamp(bounds.rows).saturating_add(2),
    )
}

fn header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let title = format!(
        " AGV Dash │ {} │ AGV {} │ 库存: {} │ 订单: {} │ 车辆: {} ",
        phase_label(state.phase),
        state.agv,
        state.kpi.inventory,
        state.kpi.orders,
        state.kpi.agv,
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(block, area);
}

fn orders_tab(f: &mut Frame, area: Rect, state: &DashboardState, model: &ViewModel) {
    let (grid_width, _) = grid_panel_size(state.grid.bounds());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(grid_width.max(20)), Constraint::Min(20)])
        .split(area);

    let grid_title = match state.grid.state() {
        ViewState::Unavailable => " 网格 (Unavailable) ",
        ViewState::Loading => " 网格 (加载中) ",
        ViewState::Ready(_) => " 网格 ",
    };
    let grid_border = if model.focus == Focus::Grid {
        Color::Green
    } else {
        Color::Blue
    };
    let cursor = (model.focus == Focus::Grid).then_some(model.form.cursor);
    let grid = Paragraph::new(Text::from(grid_lines(state, cursor))).block(
        Block::default()
            .title(grid_title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(grid_border)),
    );
    f.render_widget(grid, chunks[0]);

    let lines: Vec<Line> = match state.orders.state() {
        ViewState::Ready(rows) if rows.is_empty() => vec![Line::from("(no orders)")],
        ViewState::Ready(rows) => rows.iter().map(|r| Line::from(format_order(r))).collect(),
        ViewState::Loading => vec![Line::from("…")],
        ViewState::Unavailable => vec![Line::styled("Unavailable", Style::default().fg(Color::Red))],
    };
    let orders = Paragraph::new(Text::from(lines))
        .block(Block::default().title(" 订单 ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(orders, chunks[1]);
}

fn inventory_tab(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().title(" 库存 ").borders(Borders::ALL);
    let items = match state.inventory.state() {
        ViewState::Ready(items) => items,
        other => {
            let text = if other.is_unavailable() { "Unavailable" } else { "…" };
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
    };

    let header = Row::new(["ID", "Product", "Qty", "Zone", "Rack", "Slot"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = items.iter().map(|i| {
        Row::new(vec![
            Cell::from(i.id.to_string()),
            Cell::from(i.product_name.clone()),
            Cell::from(i.quantity.to_string()),
            Cell::from(i.zone.clone()),
            Cell::from(i.rack.clone()),
            Cell::from(format!("({}, {})", i.row_loc, i.col_loc)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{:<9}", label), style),
        Span::raw(value.to_string()),
        Span::styled(if focused { "▏" } else { "" }, style),
    ])
}

fn input_box(f: &mut Frame, area: Rect, state: &DashboardState, model: &ViewModel) {
    let error = model.local_error.as_deref().or(state.alert.as_deref());
    let title = match error {
        Some(err) => format!(" 错误: {} ", err.chars().take(60).collect::<String>()),
        None if state.is_busy() => " AGV 运行中… ".to_string(),
        None => " 输入 ".to_string(),
    };
    let border = if error.is_some() { Color::Red } else { Color::Blue };

    let (lines, hint) = match model.tab {
        Tab::Orders => (
            vec![
                input_line("Pickup", &model.form.pickup, model.focus == Focus::Pickup),
                input_line("Delivery", &model.form.delivery, model.focus == Focus::Delivery),
            ],
            " Enter 下单 │ Tab 切换 │ 网格中 Space 选格 │ Ctrl+C 取消 │ Ctrl+R 复位 │ F2 库存 │ Ctrl+Q 退出 ",
        ),
        Tab::Inventory => (
            vec![
                input_line(">", &model.inventory_input, true),
                Line::styled(INVENTORY_USAGE, Style::default().fg(Color::DarkGray)),
            ],
            " Enter 执行 │ F5 刷新 │ F2 订单 │ Ctrl+Q 退出 ",
        ),
    };

    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn status_box(f: &mut Frame, area: Rect, state: &DashboardState) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .status
        .entries()
        .take(visible)
        .map(|e| Line::from(e.to_string()))
        .collect();
    let block = Block::default().title(" 状态 ").borders(Borders::ALL);
    f.render_widget(
        Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// 绘制一帧
pub fn draw(f: &mut Frame, state: &DashboardState, model: &ViewModel) {
    let (_, grid_height) = grid_panel_size(state.grid.bounds());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(grid_height),
            Constraint::Length(4),
            Constraint::Length(8),
        ])
        .split(f.area());

    header(f, chunks[0], state);
    match model.tab {
        Tab::Orders => orders_tab(f, chunks[1], state, model),
        Tab::Inventory => inventory_tab(f, chunks[1], state),
    }
    input_box(f, chunks[2], state, model);
    status_box(f, chunks[3], state);
}
