//! 位置得分哈希 - 每张表使用不同底数的简单得分函数
//!
//! 对键的第 `i` 个 UTF-16 码元 `c_i` 与表索引 `t`：
//!
//! ```text
//! score = Σ (c_i + (t + 1)^i)
//! slot  = ((t + 1)^2 + score) mod rows
//! ```
//!
//! 全程在模 `rows` 下计算，结果与精确整数运算一致，长键也不会溢出。

use crate::{
    hash::strategy::{HashStrategy, MAX_HASH_TABLE_INDEX},
    types::SlotIndex,
};

/// 位置得分哈希策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreHashStrategy {
    rows: usize,
}

impl ScoreHashStrategy {
    /// 创建新策略
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }
}

impl HashStrategy for ScoreHashStrategy {
    fn slot_index(&self, key: &str, table_index: isize) -> Option<SlotIndex> {
        if !(0..=MAX_HASH_TABLE_INDEX).contains(&table_index) || self.rows == 0 {
            return None;
        }

        let rows = self.rows as u64;
        let base = (table_index as u64 + 1) % rows;
        let mut power = 1 % rows;
        let mut score = 0u64;
        for code in key.encode_utf16() {
            score = (score + u64::from(code) % rows + power) % rows;
            power = power * base % rows;
        }

        Some(((base * base % rows + score) % rows) as SlotIndex)
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn update_rows(&mut self, rows: usize) {
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 直接按公式做精确整数运算，仅适用于短键
    fn reference(key: &str, t: u64, rows: u64) -> u64 {
        let score: u64 = key
            .encode_utf16()
            .enumerate()
            .map(|(i, c)| u64::from(c) + (t + 1).pow(i as u32))
            .sum();
        ((t + 1).pow(2) + score) % rows
    }

    #[test]
    fn test_known_slots() {
        let h = ScoreHashStrategy::new(10);
        // c=99 a=97 t=116, 和为 312
        assert_eq!(h.slot_index("cat", 0), Some(6));
        assert_eq!(h.slot_index("cat", 1), Some(3));
        assert_eq!(h.slot_index("cat", 2), Some(4));
        assert_eq!(h.slot_index("a", 4), Some(3));
        assert_eq!(h.slot_index("", 0), Some(1));
    }

    #[test]
    fn test_matches_exact_arithmetic() {
        for rows in [10u64, 17, 23, 30] {
            let h = ScoreHashStrategy::new(rows as usize);
            for key in ["cat", "dog", "hello", "x", "cuckoo", "Ωmega"] {
                for t in 0..=4u64 {
                    assert_eq!(
                        h.slot_index(key, t as isize),
                        Some(reference(key, t, rows) as usize),
                        "key={key} t={t} rows={rows}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_table_index() {
        let h = ScoreHashStrategy::new(10);
        assert_eq!(h.slot_index("cat", -1), None);
        assert_eq!(h.slot_index("cat", 5), None);
        assert_eq!(h.slot_index("cat", isize::MAX), None);
    }

    #[test]
    fn test_in_range_and_pure() {
        let long_key = "k".repeat(200);
        for rows in 10..=30 {
            let h = ScoreHashStrategy::new(rows);
            for key in ["cat", "a", long_key.as_str()] {
                for t in 0..=4 {
                    let slot = h.slot_index(key, t).unwrap();
                    assert!(slot < rows);
                    assert_eq!(h.slot_index(key, t), Some(slot));
                }
            }
        }
    }

    #[test]
    fn test_tables_spread_keys() {
        // 同一个键在不同表中应大概率落在不同槽位
        let h = ScoreHashStrategy::new(30);
        let keys = ["apple", "banana", "cherry", "durian", "elder", "fig", "grape", "kiwi"];
        let spread = keys
            .iter()
            .filter(|key| {
                let mut slots = h.candidates(key, 5);
                slots.sort();
                slots.dedup();
                slots.len() > 1
            })
            .count();
        assert_eq!(spread, keys.len());
    }

    #[test]
    fn test_update_rows() {
        let mut h = ScoreHashStrategy::new(10);
        h.update_rows(30);
        assert_eq!(h.rows(), 30);
        assert_eq!(h.slot_index("cat", 0), Some(16));
    }
}
