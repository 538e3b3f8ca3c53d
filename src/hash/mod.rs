//! 哈希模块 - 统一管理哈希相关功能

pub mod score;
pub mod strategy;

pub use score::ScoreHashStrategy;
pub use strategy::{HashStrategy, MAX_HASH_TABLE_INDEX};

use crate::types::SlotIndex;

/// 默认哈希策略
pub fn default_hash_strategy(rows: usize) -> Box<dyn HashStrategy> {
    Box::new(ScoreHashStrategy::new(rows))
}

/// 使用默认策略计算槽位
pub fn slot_index(key: &str, table_index: isize, rows: usize) -> Option<SlotIndex> {
    ScoreHashStrategy::new(rows).slot_index(key, table_index)
}
