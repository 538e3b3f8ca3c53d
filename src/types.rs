//! 核心类型定义 - 共享类型和接口

use std::fmt;

use crate::error::CuckooError;

/// 表索引，范围 [0, tables)
pub type TableIndex = usize;

/// 槽位索引，范围 [0, rows)，由哈希函数给出
pub type SlotIndex = usize;

/// 空槽标记，任何合法键都不能等于它
pub const EMPTY_MARKER: &str = "-";

/// 槽位 - 空或保存一个键
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(String),
}

impl Slot {
    /// 检查是否为空槽位
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// 检查是否被占用
    pub fn is_occupied(&self) -> bool {
        !self.is_empty()
    }

    /// 获取槽位中的键
    pub fn key(&self) -> Option<&str> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(key) => Some(key),
        }
    }

    /// 检查槽位是否保存了指定键
    pub fn holds(&self, key: &str) -> bool {
        self.key() == Some(key)
    }

    /// 取出键并把槽位置为空
    pub fn take(&mut self) -> Slot {
        std::mem::take(self)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => f.write_str(EMPTY_MARKER),
            Slot::Occupied(key) => f.write_str(key),
        }
    }
}

/// 检查键是否合法：非空且不等于空槽标记
pub fn validate_key(key: &str) -> Result<&str, CuckooError> {
    if key.is_empty() || key == EMPTY_MARKER {
        return Err(CuckooError::InvalidKey { key: key.to_string() });
    }
    Ok(key)
}

/// 插入前的键规整：去掉首尾空白后再校验
pub fn normalize_key(raw: &str) -> Result<&str, CuckooError> {
    validate_key(raw.trim()).map_err(|_| CuckooError::InvalidKey { key: raw.to_string() })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// 插入操作
    Insert,
    /// 查找操作
    Search,
    /// 删除操作
    Delete,
    /// 踢出操作（插入过程中的一轮置换）
    Kick,
    /// 重新配置表结构
    Reconfigure,
}

impl OperationType {
    /// 判断是否为读操作
    pub fn is_read(&self) -> bool {
        matches!(self, OperationType::Search)
    }

    /// 判断是否为写操作
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "insert",
            OperationType::Search => "search",
            OperationType::Delete => "delete",
            OperationType::Kick => "kick",
            OperationType::Reconfigure => "reconfigure",
        }
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("cat").is_ok());
        assert!(matches!(validate_key(""), Err(CuckooError::InvalidKey { .. })));
        assert!(matches!(validate_key(EMPTY_MARKER), Err(CuckooError::InvalidKey { .. })));
        // 不做裁剪
        assert_eq!(validate_key(" cat ").unwrap(), " cat ");
    }

    #[test]
    fn test_normalize_key_trims() {
        assert_eq!(normalize_key("  dog ").unwrap(), "dog");
        assert!(normalize_key("   ").is_err());
        assert!(normalize_key(" - ").is_err());

        // 错误中保留原始输入
        match normalize_key("\t") {
            Err(CuckooError::InvalidKey { key }) => assert_eq!(key, "\t"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_slot_states() {
        let mut slot = Slot::Occupied("cat".into());
        assert!(slot.is_occupied());
        assert!(slot.holds("cat"));
        assert_eq!(slot.to_string(), "cat");

        let taken = slot.take();
        assert_eq!(taken.key(), Some("cat"));
        assert!(slot.is_empty());
        assert_eq!(slot.to_string(), EMPTY_MARKER);
    }

    #[test]
    fn test_operation_type() {
        assert!(OperationType::Search.is_read());
        assert!(OperationType::Kick.is_write());
        assert_eq!(OperationType::Reconfigure.as_str(), "reconfigure");
    }
}
