//! 交互式Cuckoo哈希引擎
//!
//! 在 2~5 张、每张 10~30 行的表上保存字符串键，冲突时沿表依次踢出旧键，
//! 并检测循环。每次置换都可以单步推进，供展示层逐轮渲染。
//!
//! ## 主要特性
//! - 基于字符位置的确定性哈希，可以手工验算
//! - 显式的插入状态机，支持逐轮推进
//! - 每个顶层操作恰好一个终结事件
//! - 操作统计与Prometheus导出
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_tables::*;
//!
//! fn main() {
//!     // 创建默认配置（3 x 10）的哈希表
//!     let mut map = CuckooMap::default();
//!
//!     // 插入键
//!     assert!(map.insert("cat").is_inserted());
//!
//!     // 查找键所在的表
//!     assert_eq!(map.find("cat").unwrap(), Some(0));
//!
//!     // 删除键
//!     map.delete("cat").unwrap();
//!
//!     // 打印统计信息
//!     println!("{:?}", map.stats());
//! }
//! ```

#![warn(clippy::all)]
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}
// 核心模块导出
pub mod error;
pub mod types;
pub mod hash;
pub mod map;
pub mod event;
pub mod stats;
pub mod session;

// 公共接口导出
pub use crate::{
    map::{
        CuckooMap,
        CuckooMapConfig,
        CuckooMapStats,
        DeleteOutcome,
        EvictionChain,
        InsertOutcome,
        InsertState,
        KickStep,
        Location,
        Occupancy,
        PendingInsert,
        Probe,
        Step,
        TableSet,
        DEFAULT_CONFIG,
        MAX_ROWS,
        MAX_TABLES,
        MIN_ROWS,
        MIN_TABLES,
    },
    hash::{
        HashStrategy,
        ScoreHashStrategy,
        default_hash_strategy,
        slot_index,
    },
    event::{
        BufferedEvent,
        BufferedEventSink,
        EventSink,
        LogEventSink,
        NoopEventSink,
        Notification,
        NotificationKind,
        RecordingEventSink,
    },
    stats::{
        AtomicOperationStats,
        DisabledStatsRecorder,
        OperationStatsSnapshot,
        StatsRecorder,
    },
    session::{CuckooSession, DEFAULT_STEP_DELAY},
    error::CuckooError,
    types::{OperationType, Slot, SlotIndex, TableIndex},
};

// 便捷功能函数

/// 批量插入，返回成功插入的数量
///
/// 遇到循环不会中止，后续键照常尝试。
pub fn batch_insert<'a>(map: &mut CuckooMap, keys: impl IntoIterator<Item = &'a str>) -> usize {
    keys.into_iter()
        .filter(|key| map.insert(key).is_inserted())
        .count()
}

/// 批量查找，不发事件
pub fn batch_find<'a>(
    map: &CuckooMap,
    keys: impl IntoIterator<Item = &'a str>,
) -> Vec<Option<TableIndex>> {
    keys.into_iter()
        .map(|key| map.find(key).ok().flatten())
        .collect()
}
