//! 哈希表核心模块 - 实现Cuckoo哈希表及其组件

pub mod cuckoo_map;
pub mod eviction;
pub mod load;
pub mod lookup;
pub mod table_set;

pub use cuckoo_map::{
    CuckooMap, CuckooMapConfig, CuckooMapStats, MAX_ROWS, MAX_TABLES, MIN_ROWS, MIN_TABLES,
};
pub use eviction::{EvictionChain, InsertOutcome, InsertState, KickStep, PendingInsert, Step};
pub use load::Occupancy;
pub use lookup::{DeleteOutcome, Location, Probe};
pub use table_set::TableSet;

use once_cell::sync::Lazy;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<CuckooMapConfig> = Lazy::new(CuckooMapConfig::default);
