//! 统计模块 - 统一管理哈希表操作指标

pub mod operation;

pub use operation::{AtomicOperationStats, OperationStatsSnapshot};

use crate::types::OperationType;

/// 统计记录器特征
pub trait StatsRecorder: Send + Sync {
    /// 记录一次操作
    fn record_operation(&self, op_type: OperationType, success: bool);

    /// 记录一次因循环中止的插入
    fn record_cycle(&self);

    /// 获取操作统计快照
    fn snapshot(&self) -> OperationStatsSnapshot;

    /// 重置所有统计
    fn reset(&self);

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String;
}

impl StatsRecorder for AtomicOperationStats {
    fn record_operation(&self, op_type: OperationType, success: bool) {
        self.record(op_type, success);
    }

    fn record_cycle(&self) {
        AtomicOperationStats::record_cycle(self);
    }

    fn snapshot(&self) -> OperationStatsSnapshot {
        AtomicOperationStats::snapshot(self)
    }

    fn reset(&self) {
        AtomicOperationStats::reset(self);
    }

    fn export_prometheus(&self) -> String {
        AtomicOperationStats::export_prometheus(self)
    }
}

/// 禁用统计实现
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStatsRecorder;

impl StatsRecorder for DisabledStatsRecorder {
    fn record_operation(&self, _op_type: OperationType, _success: bool) {}
    fn record_cycle(&self) {}
    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot::default()
    }
    fn reset(&self) {}
    fn export_prometheus(&self) -> String {
        String::new()
    }
}
