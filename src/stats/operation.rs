// src/stats/operation.rs
//! 操作统计 - 跟踪哈希表操作计数

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::OperationType;

/// 操作统计快照
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationStatsSnapshot {
    pub insert_count: u64,
    pub search_count: u64,
    pub delete_count: u64,
    pub kick_count: u64,
    pub reconfigure_count: u64,
    pub failure_count: u64,
    pub cycle_count: u64,
}

impl OperationStatsSnapshot {
    /// 平均每次插入的踢出次数
    pub fn kicks_per_insert(&self) -> f32 {
        if self.insert_count == 0 {
            0.0
        } else {
            self.kick_count as f32 / self.insert_count as f32
        }
    }
}

/// 原子操作统计
#[derive(Debug, Default)]
pub struct AtomicOperationStats {
    insert_count: AtomicU64,
    search_count: AtomicU64,
    delete_count: AtomicU64,
    kick_count: AtomicU64,
    reconfigure_count: AtomicU64,
    failure_count: AtomicU64,
    cycle_count: AtomicU64,
}

impl AtomicOperationStats {
    /// 创建新统计
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, op_type: OperationType) -> &AtomicU64 {
        match op_type {
            OperationType::Insert => &self.insert_count,
            OperationType::Search => &self.search_count,
            OperationType::Delete => &self.delete_count,
            OperationType::Kick => &self.kick_count,
            OperationType::Reconfigure => &self.reconfigure_count,
        }
    }

    /// 记录操作
    pub fn record(&self, op_type: OperationType, success: bool) {
        self.counter(op_type).fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cycle(&self) {
        self.cycle_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            insert_count: self.insert_count.load(Ordering::Relaxed),
            search_count: self.search_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            kick_count: self.kick_count.load(Ordering::Relaxed),
            reconfigure_count: self.reconfigure_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            cycle_count: self.cycle_count.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.insert_count,
            &self.search_count,
            &self.delete_count,
            &self.kick_count,
            &self.reconfigure_count,
            &self.failure_count,
            &self.cycle_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        let op_types = [
            OperationType::Insert,
            OperationType::Search,
            OperationType::Delete,
            OperationType::Kick,
            OperationType::Reconfigure,
        ];

        for op in op_types {
            let count = self.counter(op).load(Ordering::Relaxed);
            output.push_str(&format!(
                "# HELP cuckoo_operation_{}_count Total {} operations\n",
                op.as_str(), op.as_str()
            ));
            output.push_str(&format!("# TYPE cuckoo_operation_{}_count counter\n", op.as_str()));
            output.push_str(&format!("cuckoo_operation_{}_count {}\n", op.as_str(), count));
        }

        output.push_str("# HELP cuckoo_operation_failure_count Total failed operations\n");
        output.push_str("# TYPE cuckoo_operation_failure_count counter\n");
        output.push_str(&format!(
            "cuckoo_operation_failure_count {}\n",
            self.failure_count.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP cuckoo_operation_cycle_count Insertions aborted by a kick cycle\n");
        output.push_str("# TYPE cuckoo_operation_cycle_count counter\n");
        output.push_str(&format!(
            "cuckoo_operation_cycle_count {}\n",
            self.cycle_count.load(Ordering::Relaxed)
        ));

        output
    }
}
