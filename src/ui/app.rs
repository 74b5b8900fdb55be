//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将表单输入与快捷键转为 Command 发送给编排器，
//! 每帧用 draw 渲染 DashboardState 与本地 ViewModel。

use std::io::{self, Stdout};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, DashboardState};
use crate::grid::GridBounds;
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::form::{parse_inventory_command, Focus, Tab};
use crate::ui::render::{draw, ViewModel};

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<DashboardState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(cmd_tx);
    let mut model = ViewModel::new(state_rx.borrow().agv);

    let result = loop {
        let state = state_rx.borrow().clone();

        match events.poll() {
            Ok(Some(AppEvent::Command(Command::Quit))) => {
                events.send(Command::Quit);
                break Ok(());
            }
            Ok(Some(AppEvent::Command(_))) => model.local_error = None,
            Ok(Some(AppEvent::Key(key))) => {
                if let Some(cmd) = handle_key(&mut model, key, state.grid.bounds()) {
                    events.send(cmd);
                }
            }
            Ok(None) => {}
            Err(e) => break Err(e),
        }

        if let Err(e) = terminal.draw(|f| draw(f, &state, &model)) {
            break Err(anyhow::Error::from(e));
        }
    };

    restore_terminal(&mut terminal)?;
    result
}

/// 编辑本地表单；需要发给编排器的返回 Command
fn handle_key(model: &mut ViewModel, key: KeyEvent, bounds: GridBounds) -> Option<Command> {
    if key.code == KeyCode::F(2) {
        model.tab = match model.tab {
            Tab::Orders => Tab::Inventory,
            Tab::Inventory => Tab::Orders,
        };
        model.local_error = None;
        return None;
    }

    match model.tab {
        Tab::Orders => order_key(model, key, bounds),
        Tab::Inventory => inventory_key(model, key),
    }
}

fn order_key(model: &mut ViewModel, key: KeyEvent, bounds: GridBounds) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab => model.focus = model.focus.next(),
        KeyCode::BackTab => model.focus = model.focus.prev(),
        KeyCode::Char('u') if ctrl => {
            model.form.clear();
            model.local_error = None;
        }
        KeyCode::Up if model.focus == Focus::Grid => model.form.move_cursor(-1, 0, bounds),
        KeyCode::Down if model.focus == Focus::Grid => model.form.move_cursor(1, 0, bounds),
        KeyCode::Left if model.focus == Focus::Grid => model.form.move_cursor(0, -1, bounds),
        KeyCode::Right if model.focus == Focus::Grid => model.form.move_cursor(0, 1, bounds),
        KeyCode::Char(' ') | KeyCode::Enter if model.focus == Focus::Grid => {
            if !model.form.fill_from_cursor() {
                model.local_error = Some("Pickup and delivery already set (Ctrl+U clears)".into());
            }
        }
        KeyCode::Enter => {
            model.local_error = None;
            return Some(model.form.submit());
        }
        KeyCode::Backspace => {
            if let Some(field) = model.form.field_mut(model.focus) {
                field.pop();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(field) = model.form.field_mut(model.focus) {
                field.push(c);
            }
        }
        _ => {}
    }
    None
}

fn inventory_key(model: &mut ViewModel, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Enter => match parse_inventory_command(&model.inventory_input) {
            Ok(cmd) => {
                model.inventory_input.clear();
                model.local_error = None;
                return Some(cmd);
            }
            Err(e) => model.local_error = Some(e),
        },
        KeyCode::Backspace => {
            model.inventory_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.inventory_input.push(c)
        }
        _ => {}
    }
    None
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
