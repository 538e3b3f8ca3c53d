//! 统一错误处理 - 所有可能错误类型和恢复逻辑

/// Cuckoo哈希表可能发生的错误
///
/// 所有错误都在顶层操作边界可恢复：调用方得到通知后可以换一个输入重试。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CuckooError {
    #[error("键不能为空或为空槽标记: {key:?}")]
    InvalidKey {
        key: String,
    },

    #[error("键已存在: {key}")]
    DuplicateKey {
        key: String,
    },

    #[error("键不存在: {key}")]
    KeyNotFound {
        key: String,
    },

    #[error("哈希表索引越界: {table_index} (允许范围 0..=4)")]
    HashIndexOutOfRange {
        table_index: isize,
    },

    #[error("检测到循环踢出路径 (表: {table_index}, 键: {key})，需要重新哈希")]
    CycleDetected {
        table_index: usize,
        key: String,
    },

    #[error("踢出路径超过最大轮数限制 ({limit})，需要重新哈希")]
    KickPathExceeded {
        limit: usize,
    },

    #[error("表索引越界: {table_index} (表数量: {tables})")]
    TableIndexOutOfRange {
        table_index: usize,
        tables: usize,
    },

    #[error("槽位索引越界: {slot_index} (行数: {rows})")]
    SlotIndexOutOfRange {
        slot_index: usize,
        rows: usize,
    },

    #[error("无效配置: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("已有插入操作正在进行中")]
    InsertInProgress,

    #[error("没有正在进行的插入操作")]
    NoInsertInProgress,
}

impl CuckooError {
    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidKey { .. } => Some("输入非空且不等于空槽标记的键"),
            Self::DuplicateKey { .. } => Some("键已在表中，无需重复插入"),
            Self::KeyNotFound { .. } => Some("确认键值是否存在"),
            Self::HashIndexOutOfRange { .. } => Some("哈希函数只支持表索引 0..=4"),
            Self::CycleDetected { .. } => Some("更换表数量或行数后重新插入"),
            Self::KickPathExceeded { .. } => Some("增加最大踢出轮数或扩大表"),
            Self::TableIndexOutOfRange { .. } => Some("检查表索引是否小于表数量"),
            Self::SlotIndexOutOfRange { .. } => Some("哈希策略与行数不一致"),
            Self::InvalidConfig { .. } => Some("检查配置参数"),
            Self::InsertInProgress => Some("等待当前插入完成后重试"),
            Self::NoInsertInProgress => None,
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// 是否属于循环类错误（重复的 (表, 键) 对或超过轮数上限）
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. } | Self::KickPathExceeded { .. })
    }

    /// 是否应由调用方排队后重试
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::InsertInProgress)
    }
}
