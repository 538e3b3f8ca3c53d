//! 负载统计 - 每次都扫描整张表重新计算，不做增量维护

use std::fmt;

use crate::{error::CuckooError, types::TableIndex};

use super::table_set::TableSet;

/// 单张表的占用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occupancy {
    pub used: usize,
    pub capacity: usize,
}

impl Occupancy {
    /// 负载因子
    pub fn ratio(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f32 / self.capacity as f32
        }
    }

    pub fn is_full(&self) -> bool {
        self.used == self.capacity
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.used, self.capacity)
    }
}

/// 统计一张表的非空槽位数
pub fn occupancy(tables: &TableSet, table_index: TableIndex) -> Result<Occupancy, CuckooError> {
    let table = tables.table(table_index).ok_or(CuckooError::TableIndexOutOfRange {
        table_index,
        tables: tables.table_count(),
    })?;
    Ok(Occupancy {
        used: table.iter().filter(|slot| slot.is_occupied()).count(),
        capacity: table.len(),
    })
}

/// 按表顺序统计所有表
pub fn occupancy_all(tables: &TableSet) -> Vec<Occupancy> {
    tables
        .tables()
        .map(|table| Occupancy {
            used: table.iter().filter(|slot| slot.is_occupied()).count(),
            capacity: table.len(),
        })
        .collect()
}

/// 全部表的总体负载
pub fn total(tables: &TableSet) -> Occupancy {
    occupancy_all(tables)
        .into_iter()
        .fold(Occupancy::default(), |acc, o| Occupancy {
            used: acc.used + o.used,
            capacity: acc.capacity + o.capacity,
        })
}
