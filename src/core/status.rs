//! 状态日志：面向用户的操作记录，最新一条在最前
//!
//! 每条带本地时间戳 `[HH:MM:SS]`；超过容量时丢弃最旧的。

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

/// 一条状态日志
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

#[derive(Clone, Debug)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(StatusEntry {
            at: Local::now(),
            message: message.into(),
        });
        self.entries.truncate(self.capacity);
    }

    /// 最新在前
    pub fn entries(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    /// 仅消息文本，最新在前
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.front()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages().any(|m| m == message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new(200)
    }
}
