//! 事件处理
//!
//! 轮询 crossterm 键盘事件，将 Ctrl+C/Esc、Ctrl+R、F5、Ctrl+Q 转为 Command（Cancel/Reset/Refresh/Quit），
//! 其余按键交给 run_app 编辑表单，Enter 时发送 CreateOrder 或库存命令。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;

/// 应用事件：来自快捷键的 Command 或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    Key(KeyEvent),
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent，send 发送命令
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let cmd = match key.code {
            KeyCode::Char('c') if ctrl => Command::Cancel,
            KeyCode::Esc => Command::Cancel,
            KeyCode::Char('r') if ctrl => Command::Reset,
            KeyCode::F(5) => Command::Refresh,
            // Quit 由 run_app 转发，以便先恢复终端
            KeyCode::Char('q') if ctrl => return AppEvent::Command(Command::Quit),
            _ => return AppEvent::Key(key),
        };
        self.send(cmd.clone());
        AppEvent::Command(cmd)
    }

    pub fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("dashboard loop has stopped; command dropped");
        }
    }
}
