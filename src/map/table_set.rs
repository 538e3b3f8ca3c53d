//! 表集合 - 固定形状的二维槽位存储
//!
//! 只负责按 (表索引, 槽位索引) 读写，不校验键内容，调用方负责校验。

use std::fmt;

use crate::{
    error::CuckooError,
    types::{Slot, SlotIndex, TableIndex},
};

/// `tables` 张表，每张 `rows` 个槽位
#[derive(Clone, PartialEq, Eq)]
pub struct TableSet {
    tables: Vec<Vec<Slot>>,
    rows: usize,
}

impl TableSet {
    /// 创建全空的表集合
    pub fn new(tables: usize, rows: usize) -> Self {
        Self {
            tables: vec![vec![Slot::Empty; rows]; tables],
            rows,
        }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 读取槽位，越界时返回 `None`
    pub fn get(&self, table_index: TableIndex, slot_index: SlotIndex) -> Option<&Slot> {
        self.tables.get(table_index)?.get(slot_index)
    }

    /// 写入槽位并返回旧值
    pub fn set(
        &mut self,
        table_index: TableIndex,
        slot_index: SlotIndex,
        slot: Slot,
    ) -> Result<Slot, CuckooError> {
        let tables = self.tables.len();
        let rows = self.rows;
        let target = self
            .tables
            .get_mut(table_index)
            .ok_or(CuckooError::TableIndexOutOfRange { table_index, tables })?
            .get_mut(slot_index)
            .ok_or(CuckooError::SlotIndexOutOfRange { slot_index, rows })?;
        Ok(std::mem::replace(target, slot))
    }

    /// 清空槽位并返回旧值
    pub fn clear(&mut self, table_index: TableIndex, slot_index: SlotIndex) -> Result<Slot, CuckooError> {
        self.set(table_index, slot_index, Slot::Empty)
    }

    /// 所有槽位置为空，形状不变
    pub fn reset(&mut self) {
        for table in &mut self.tables {
            table.fill(Slot::Empty);
        }
    }

    /// 获取一张表的全部槽位
    pub fn table(&self, table_index: TableIndex) -> Option<&[Slot]> {
        self.tables.get(table_index).map(Vec::as_slice)
    }

    /// 按表顺序遍历
    pub fn tables(&self) -> impl Iterator<Item = &[Slot]> + '_ {
        self.tables.iter().map(Vec::as_slice)
    }

    /// 遍历所有已占用槽位
    pub fn occupied(&self) -> impl Iterator<Item = (TableIndex, SlotIndex, &str)> + '_ {
        self.tables.iter().enumerate().flat_map(|(t, table)| {
            table
                .iter()
                .enumerate()
                .filter_map(move |(s, slot)| slot.key().map(|key| (t, s, key)))
        })
    }
}

impl fmt::Debug for TableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableSet(tables: {}, rows: {})", self.tables.len(), self.rows)
    }
}

impl fmt::Display for TableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (t, table) in self.tables.iter().enumerate() {
            write!(f, "T{t}:")?;
            for slot in table {
                write!(f, " {slot}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
