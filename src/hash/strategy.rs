//! 哈希策略模块 - 定义槽位定位策略

use crate::types::{SlotIndex, TableIndex};

/// 哈希函数可接受的最大表索引（与实际表数量无关）
pub const MAX_HASH_TABLE_INDEX: isize = 4;

/// 哈希策略特征
///
/// `(key, table_index) -> slot_index` 必须是纯函数：行数不变时结果不变。
pub trait HashStrategy: Send + Sync {
    /// 计算键在指定表中的槽位
    ///
    /// 表索引不在 `0..=4` 时返回 `None`，这一检查先于其他任何计算。
    fn slot_index(&self, key: &str, table_index: isize) -> Option<SlotIndex>;

    /// 当前行数
    fn rows(&self) -> usize;

    /// 更新行数
    fn update_rows(&mut self, rows: usize);

    /// 键在前 `tables` 张表中的候选槽位
    fn candidates(&self, key: &str, tables: usize) -> Vec<Option<SlotIndex>> {
        (0..tables)
            .map(|table_index| self.slot_index(key, table_index as isize))
            .collect()
    }
}

/// 把内部使用的表索引转换为哈希函数的参数
#[inline]
pub(crate) fn hash_arg(table_index: TableIndex) -> isize {
    isize::try_from(table_index).unwrap_or(isize::MAX)
}
