//! 查找与删除 - 每张表只探测一个槽位
//!
//! 与踢出引擎相互独立，只共享哈希策略和表集合。

use crate::{
    error::CuckooError,
    hash::strategy::{hash_arg, HashStrategy},
    types::{SlotIndex, TableIndex},
};

use super::table_set::TableSet;

/// 键所在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub table_index: TableIndex,
    pub slot_index: SlotIndex,
}

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Location),
    NotFound,
}

/// 一次探测记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub location: Location,
    pub matched: bool,
}

/// 计算键在指定表中的位置
pub(crate) fn locate(
    hasher: &dyn HashStrategy,
    key: &str,
    table_index: TableIndex,
) -> Result<Location, CuckooError> {
    let arg = hash_arg(table_index);
    let slot_index = hasher
        .slot_index(key, arg)
        .ok_or(CuckooError::HashIndexOutOfRange { table_index: arg })?;
    Ok(Location { table_index, slot_index })
}

/// 按表顺序查找键，首次命中即返回
pub fn find(
    tables: &TableSet,
    hasher: &dyn HashStrategy,
    key: &str,
) -> Result<Option<Location>, CuckooError> {
    for table_index in 0..tables.table_count() {
        let location = locate(hasher, key, table_index)?;
        if tables
            .get(location.table_index, location.slot_index)
            .is_some_and(|slot| slot.holds(key))
        {
            return Ok(Some(location));
        }
    }
    Ok(None)
}

/// 删除键，只清空第一个命中的槽位
pub fn delete(
    tables: &mut TableSet,
    hasher: &dyn HashStrategy,
    key: &str,
) -> Result<DeleteOutcome, CuckooError> {
    match find(tables, hasher, key)? {
        Some(location) => {
            tables.clear(location.table_index, location.slot_index)?;
            Ok(DeleteOutcome::Deleted(location))
        }
        None => Ok(DeleteOutcome::NotFound),
    }
}

/// 探测每张表的候选槽位，不提前结束
pub fn trace(
    tables: &TableSet,
    hasher: &dyn HashStrategy,
    key: &str,
) -> Result<Vec<Probe>, CuckooError> {
    (0..tables.table_count())
        .map(|table_index| {
            let location = locate(hasher, key, table_index)?;
            let matched = tables
                .get(location.table_index, location.slot_index)
                .is_some_and(|slot| slot.holds(key));
            Ok(Probe { location, matched })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash::ScoreHashStrategy, types::Slot};

    fn tables_with_cat() -> (TableSet, ScoreHashStrategy) {
        let mut tables = TableSet::new(3, 10);
        // cat 在表1的候选槽位是 3
        tables.set(1, 3, Slot::Occupied("cat".into())).unwrap();
        (tables, ScoreHashStrategy::new(10))
    }

    #[test]
    fn test_find() {
        let (tables, hasher) = tables_with_cat();
        assert_eq!(
            find(&tables, &hasher, "cat").unwrap(),
            Some(Location { table_index: 1, slot_index: 3 })
        );
        assert_eq!(find(&tables, &hasher, "dog").unwrap(), None);
    }

    #[test]
    fn test_key_outside_candidate_slot_is_invisible() {
        let mut tables = TableSet::new(3, 10);
        tables.set(0, 0, Slot::Occupied("cat".into())).unwrap();
        let hasher = ScoreHashStrategy::new(10);
        assert_eq!(find(&tables, &hasher, "cat").unwrap(), None);
    }

    #[test]
    fn test_delete_present_and_absent() {
        let (mut tables, hasher) = tables_with_cat();
        let before = tables.clone();
        assert_eq!(delete(&mut tables, &hasher, "dog").unwrap(), DeleteOutcome::NotFound);
        assert_eq!(tables, before);

        assert_eq!(
            delete(&mut tables, &hasher, "cat").unwrap(),
            DeleteOutcome::Deleted(Location { table_index: 1, slot_index: 3 })
        );
        assert_eq!(find(&tables, &hasher, "cat").unwrap(), None);
    }

    #[test]
    fn test_delete_clears_only_first_match() {
        let mut tables = TableSet::new(3, 10);
        tables.set(0, 6, Slot::Occupied("cat".into())).unwrap();
        tables.set(2, 4, Slot::Occupied("cat".into())).unwrap();
        let hasher = ScoreHashStrategy::new(10);

        delete(&mut tables, &hasher, "cat").unwrap();
        assert!(tables.get(0, 6).unwrap().is_empty());
        assert!(tables.get(2, 4).unwrap().holds("cat"));
    }

    #[test]
    fn test_trace_probes_every_table() {
        let (tables, hasher) = tables_with_cat();
        let probes = trace(&tables, &hasher, "cat").unwrap();
        assert_eq!(probes.len(), 3);
        assert_eq!(
            probes.iter().map(|p| p.location.slot_index).collect::<Vec<_>>(),
            vec![6, 3, 4]
        );
        assert_eq!(probes.iter().filter(|p| p.matched).count(), 1);
        assert!(probes[1].matched);
    }

    #[test]
    fn test_hash_error_propagates() {
        // 6 张表超出哈希函数支持的范围
        let tables = TableSet::new(6, 10);
        let hasher = ScoreHashStrategy::new(10);
        assert_eq!(
            find(&tables, &hasher, "cat"),
            Err(CuckooError::HashIndexOutOfRange { table_index: 5 })
        );
    }
}
