//! 事件通知 - 引擎向外部展示层发出的结果通知
//!
//! 每个顶层操作（插入、删除、查找、重新配置）恰好产生一个终结事件：
//! `on_success` 或 `on_error`。插入过程中的每一轮置换可以额外通过
//! `on_progress` 上报，它不算终结事件。

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{error::CuckooError, map::eviction::KickStep};

/// 事件接收器特征
pub trait EventSink: Send + Sync {
    /// 操作成功
    fn on_success(&self, message: &str);

    /// 操作失败
    fn on_error(&self, message: &str);

    /// 插入过程中完成了一轮置换
    fn on_progress(&self, _step: &KickStep) {}
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn on_success(&self, message: &str) {
        (**self).on_success(message)
    }

    fn on_error(&self, message: &str) {
        (**self).on_error(message)
    }

    fn on_progress(&self, step: &KickStep) {
        (**self).on_progress(step)
    }
}

/// 终结事件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// 一条终结事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }

    /// 发送给接收器
    pub fn dispatch(&self, sink: &dyn EventSink) {
        match self.kind {
            NotificationKind::Success => sink.on_success(&self.message),
            NotificationKind::Error => sink.on_error(&self.message),
        }
    }
}

/// 错误对应的用户提示
pub fn error_message(error: &CuckooError) -> String {
    match error {
        CuckooError::InvalidKey { .. } => "Value cannot be empty!".to_string(),
        CuckooError::DuplicateKey { key } => format!("Value has already been added: {key}"),
        CuckooError::KeyNotFound { key } => format!("Value not found: {key}"),
        CuckooError::HashIndexOutOfRange { .. } => "Error on hashing".to_string(),
        CuckooError::CycleDetected { .. } | CuckooError::KickPathExceeded { .. } => {
            "Cycle present! Must rehash!".to_string()
        }
        CuckooError::InsertInProgress => "Another insertion is still running".to_string(),
        other => other.to_string(),
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn on_success(&self, _message: &str) {}
    fn on_error(&self, _message: &str) {}
}

/// 把事件写入日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn on_success(&self, message: &str) {
        log_info!("{}", message);
    }

    fn on_error(&self, message: &str) {
        log_warn!("{}", message);
    }

    fn on_progress(&self, step: &KickStep) {
        log_debug!("{}", step);
    }
}

/// 记录所有事件，供展示层或测试读取
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    notifications: Mutex<Vec<Notification>>,
    progress: Mutex<Vec<KickStep>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的终结事件
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// 已收到的置换进度
    pub fn progress(&self) -> Vec<KickStep> {
        self.progress.lock().clone()
    }

    /// 最近一条终结事件
    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().last().cloned()
    }

    /// 取出并清空所有记录
    pub fn drain(&self) -> Vec<Notification> {
        self.progress.lock().clear();
        std::mem::take(&mut *self.notifications.lock())
    }
}

impl EventSink for RecordingEventSink {
    fn on_success(&self, message: &str) {
        self.notifications.lock().push(Notification::success(message));
    }

    fn on_error(&self, message: &str) {
        self.notifications.lock().push(Notification::error(message));
    }

    fn on_progress(&self, step: &KickStep) {
        self.progress.lock().push(step.clone());
    }
}

/// 暂存的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferedEvent {
    Notification(Notification),
    Progress(KickStep),
}

impl BufferedEvent {
    /// 发送给接收器
    pub fn dispatch(&self, sink: &dyn EventSink) {
        match self {
            BufferedEvent::Notification(notification) => notification.dispatch(sink),
            BufferedEvent::Progress(step) => sink.on_progress(step),
        }
    }
}

/// 按到达顺序暂存事件，由持有者在锁外转发
#[derive(Debug, Default)]
pub struct BufferedEventSink {
    events: Mutex<Vec<BufferedEvent>>,
}

impl BufferedEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出并清空暂存的事件
    pub fn take(&self) -> Vec<BufferedEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for BufferedEventSink {
    fn on_success(&self, message: &str) {
        self.events
            .lock()
            .push(BufferedEvent::Notification(Notification::success(message)));
    }

    fn on_error(&self, message: &str) {
        self.events
            .lock()
            .push(BufferedEvent::Notification(Notification::error(message)));
    }

    fn on_progress(&self, step: &KickStep) {
        self.events.lock().push(BufferedEvent::Progress(step.clone()));
    }
}
