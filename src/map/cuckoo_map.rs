//! Cuckoo哈希表核心实现
//!
//! [`CuckooMap`] 把表集合、哈希策略、踢出引擎、查找引擎和负载统计组合在一起，
//! 并负责为每个顶层操作恰好发出一个终结事件。引擎本身不做互斥：
//! 同一时刻只允许一条踢出路径处于进行中，期间其他插入、删除、查找与
//! 重新配置都会被拒绝（返回 [`CuckooError::InsertInProgress`]）。

use std::{fmt, sync::Arc};

use crate::{
    error::CuckooError,
    event::{error_message, EventSink, LogEventSink, Notification},
    hash::{HashStrategy, ScoreHashStrategy},
    stats::{AtomicOperationStats, OperationStatsSnapshot, StatsRecorder},
    types::{OperationType, SlotIndex, TableIndex},
};

use super::{
    eviction::{InsertOutcome, PendingInsert, Step},
    load::{self, Occupancy},
    lookup::{self, DeleteOutcome, Location, Probe},
    table_set::TableSet,
};

pub const MIN_TABLES: usize = 2;
pub const MAX_TABLES: usize = 5;
pub const MIN_ROWS: usize = 10;
pub const MAX_ROWS: usize = 30;

/// 哈希表配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuckooMapConfig {
    /// 表数量 [2, 5]
    pub tables: usize,
    /// 每张表的行数 [10, 30]
    pub rows: usize,
    /// 单次插入最多写入的轮数，`None` 表示 `tables * rows`
    pub max_kick_rounds: Option<usize>,
}

impl Default for CuckooMapConfig {
    fn default() -> Self {
        Self {
            tables: 3,
            rows: 10,
            max_kick_rounds: None,
        }
    }
}

impl CuckooMapConfig {
    pub fn new(tables: usize, rows: usize) -> Self {
        Self { tables, rows, max_kick_rounds: None }
    }

    pub fn with_max_kick_rounds(mut self, rounds: usize) -> Self {
        self.max_kick_rounds = Some(rounds);
        self
    }

    /// 从外部输入的数值构造，拒绝非整数
    pub fn from_values(tables: f64, rows: f64) -> Result<Self, CuckooError> {
        let tables = integral("tables", tables)?;
        let rows = integral("rows", rows)?;
        let config = Self::new(tables, rows);
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), CuckooError> {
        if !(MIN_TABLES..=MAX_TABLES).contains(&self.tables) {
            return Err(CuckooError::InvalidConfig {
                reason: format!("tables must be in [{MIN_TABLES}, {MAX_TABLES}], got {}", self.tables),
            });
        }
        if !(MIN_ROWS..=MAX_ROWS).contains(&self.rows) {
            return Err(CuckooError::InvalidConfig {
                reason: format!("rows must be in [{MIN_ROWS}, {MAX_ROWS}], got {}", self.rows),
            });
        }
        if self.max_kick_rounds == Some(0) {
            return Err(CuckooError::InvalidConfig {
                reason: "max_kick_rounds must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// 单次插入的轮数上限
    pub fn kick_limit(&self) -> usize {
        self.max_kick_rounds.unwrap_or(self.tables * self.rows)
    }
}

fn integral(name: &str, value: f64) -> Result<usize, CuckooError> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > usize::MAX as f64 {
        return Err(CuckooError::InvalidConfig {
            reason: format!("{name} must be a non-negative integer, got {value}"),
        });
    }
    Ok(value as usize)
}

/// 哈希表统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CuckooMapStats {
    pub size: usize,
    pub capacity: usize,
    pub load_factor: f32,
    pub last_collision_depth: usize,
    pub operations: OperationStatsSnapshot,
}

/// Cuckoo哈希表
pub struct CuckooMap {
    config: CuckooMapConfig,
    tables: TableSet,
    hasher: Box<dyn HashStrategy>,
    events: Arc<dyn EventSink>,
    stats_recorder: Arc<dyn StatsRecorder>,
    in_flight: Option<PendingInsert>,
    last_collision_depth: usize,
}

impl Default for CuckooMap {
    fn default() -> Self {
        let config = CuckooMapConfig::default();
        Self {
            tables: TableSet::new(config.tables, config.rows),
            hasher: Box::new(ScoreHashStrategy::new(config.rows)),
            events: Arc::new(LogEventSink),
            stats_recorder: Arc::new(AtomicOperationStats::new()),
            in_flight: None,
            last_collision_depth: 0,
            config,
        }
    }
}

impl CuckooMap {
    /// 使用默认组件创建新哈希表
    pub fn new(config: CuckooMapConfig) -> Result<Self, CuckooError> {
        let hasher = Box::new(ScoreHashStrategy::new(config.rows));
        Self::with_components(
            config,
            hasher,
            Arc::new(LogEventSink),
            Arc::new(AtomicOperationStats::new()),
        )
    }

    /// 使用指定组件创建新哈希表
    pub fn with_components(
        config: CuckooMapConfig,
        mut hasher: Box<dyn HashStrategy>,
        events: Arc<dyn EventSink>,
        stats_recorder: Arc<dyn StatsRecorder>,
    ) -> Result<Self, CuckooError> {
        config.validate()?;
        hasher.update_rows(config.rows);
        log_info!("tables created: {} x {}", config.tables, config.rows);
        Ok(Self {
            tables: TableSet::new(config.tables, config.rows),
            hasher,
            events,
            stats_recorder,
            in_flight: None,
            last_collision_depth: 0,
            config,
        })
    }

    /// 替换事件接收器
    pub fn set_event_sink(&mut self, events: Arc<dyn EventSink>) {
        self.events = events;
    }

    /// 当前事件接收器
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    pub fn config(&self) -> &CuckooMapConfig {
        &self.config
    }

    /// 当前表内容
    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn hasher(&self) -> &dyn HashStrategy {
        self.hasher.as_ref()
    }

    /// 正在进行的插入
    pub fn in_flight(&self) -> Option<&PendingInsert> {
        self.in_flight.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 当前或最近一次插入已发生的踢出次数
    ///
    /// 键通过非空校验后归零（重复键也归零），每轮置换后更新，
    /// 因循环中止的插入保留中止前的次数。
    pub fn last_collision_depth(&self) -> usize {
        self.last_collision_depth
    }

    /// 同步插入一个键，跑完整条踢出路径
    pub fn insert(&mut self, key: &str) -> InsertOutcome {
        if let Err(e) = self.begin_insert(key) {
            return InsertOutcome::Rejected(e);
        }
        loop {
            match self.step() {
                Ok(Step::Placed(_)) => continue,
                Ok(Step::Completed(_, outcome)) | Ok(Step::Finished(outcome)) => return outcome,
                Err(e) => return InsertOutcome::Rejected(e),
            }
        }
    }

    /// 开始一次逐步插入
    ///
    /// 键非法、重复或已有插入在进行中时立即失败，并发出错误事件。
    pub fn begin_insert(&mut self, key: &str) -> Result<(), CuckooError> {
        if self.in_flight.is_some() {
            return Err(self.reject(OperationType::Insert, CuckooError::InsertInProgress));
        }
        match PendingInsert::begin(&self.tables, self.hasher.as_ref(), key, self.config.kick_limit()) {
            Ok(pending) => {
                self.last_collision_depth = 0;
                self.in_flight = Some(pending);
                Ok(())
            }
            Err(e) => {
                if !matches!(e, CuckooError::InvalidKey { .. }) {
                    self.last_collision_depth = 0;
                }
                Err(self.reject(OperationType::Insert, e))
            }
        }
    }

    /// 推进正在进行的插入一轮
    ///
    /// 返回终结结果（[`Step::Completed`] 或 [`Step::Finished`]）时插入已经结束：
    /// 终结事件已发出，哈希表不再处于忙碌状态。
    pub fn step(&mut self) -> Result<Step, CuckooError> {
        let pending = self.in_flight.as_mut().ok_or(CuckooError::NoInsertInProgress)?;
        let step = pending.step(&mut self.tables, self.hasher.as_ref());
        let key = pending.key().to_string();

        if let Some(kick) = step.kick() {
            let evicted = kick.evicted.is_some();
            if evicted {
                self.stats_recorder.record_operation(OperationType::Kick, true);
            }
            self.last_collision_depth = kick.depth + usize::from(evicted);
            self.events.on_progress(kick);
        }
        if let Some(outcome) = step.outcome() {
            self.in_flight = None;
            self.finish_insert(&key, outcome);
        }
        Ok(step)
    }

    fn finish_insert(&mut self, key: &str, outcome: &InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted { collision_depth } => {
                self.stats_recorder.record_operation(OperationType::Insert, true);
                log_debug!("inserted key={} collision_depth={}", key, collision_depth);
                self.emit(Notification::success(format!("Value successfully inserted: {key}")));
            }
            InsertOutcome::CycleDetected(e) => {
                self.stats_recorder.record_cycle();
                self.stats_recorder.record_operation(OperationType::Insert, false);
                self.emit(Notification::error(error_message(e)));
            }
            InsertOutcome::Rejected(e) => {
                self.stats_recorder.record_operation(OperationType::Insert, false);
                self.emit(Notification::error(error_message(e)));
            }
        }
    }

    /// 查找键所在的表（纯读取，不发事件）
    pub fn find(&self, key: &str) -> Result<Option<TableIndex>, CuckooError> {
        Ok(lookup::find(&self.tables, self.hasher.as_ref(), key)?.map(|l| l.table_index))
    }

    /// 检查键是否存在
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.find(key), Ok(Some(_)))
    }

    /// 顶层查找，发出一个终结事件
    pub fn search(&self, key: &str) -> Result<Option<Location>, CuckooError> {
        if self.in_flight.is_some() {
            return Err(self.reject(OperationType::Search, CuckooError::InsertInProgress));
        }
        match lookup::find(&self.tables, self.hasher.as_ref(), key) {
            Ok(Some(location)) => {
                self.stats_recorder.record_operation(OperationType::Search, true);
                self.emit(Notification::success(format!(
                    "Found {key} in table {} at row {}",
                    location.table_index, location.slot_index
                )));
                Ok(Some(location))
            }
            Ok(None) => {
                self.stats_recorder.record_operation(OperationType::Search, false);
                self.emit(Notification::error(error_message(&CuckooError::KeyNotFound {
                    key: key.to_string(),
                })));
                Ok(None)
            }
            Err(e) => Err(self.reject(OperationType::Search, e)),
        }
    }

    /// 删除键，发出一个终结事件
    pub fn delete(&mut self, key: &str) -> Result<DeleteOutcome, CuckooError> {
        if self.in_flight.is_some() {
            return Err(self.reject(OperationType::Delete, CuckooError::InsertInProgress));
        }
        match lookup::delete(&mut self.tables, self.hasher.as_ref(), key) {
            Ok(DeleteOutcome::Deleted(location)) => {
                log_debug!("deleted key={} at [{}, {}]", key, location.table_index, location.slot_index);
                self.stats_recorder.record_operation(OperationType::Delete, true);
                self.emit(Notification::success(format!("Deleted: {key}")));
                Ok(DeleteOutcome::Deleted(location))
            }
            Ok(DeleteOutcome::NotFound) => {
                self.stats_recorder.record_operation(OperationType::Delete, false);
                self.emit(Notification::error(error_message(&CuckooError::KeyNotFound {
                    key: key.to_string(),
                })));
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(self.reject(OperationType::Delete, e)),
        }
    }

    /// 键在每张表中的候选槽位
    pub fn candidates(&self, key: &str) -> Vec<Option<SlotIndex>> {
        self.hasher.candidates(key, self.config.tables)
    }

    /// 探测每张表的候选槽位并标记命中
    pub fn trace(&self, key: &str) -> Result<Vec<Probe>, CuckooError> {
        lookup::trace(&self.tables, self.hasher.as_ref(), key)
    }

    /// 单张表的占用情况
    pub fn occupancy(&self, table_index: TableIndex) -> Result<Occupancy, CuckooError> {
        load::occupancy(&self.tables, table_index)
    }

    /// 所有表的占用情况
    pub fn occupancy_all(&self) -> Vec<Occupancy> {
        load::occupancy_all(&self.tables)
    }

    /// 已保存的键数量
    pub fn len(&self) -> usize {
        load::total(&self.tables).used
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 总槽位数
    pub fn capacity(&self) -> usize {
        self.config.tables * self.config.rows
    }

    /// 获取负载因子
    pub fn load_factor(&self) -> f32 {
        load::total(&self.tables).ratio()
    }

    /// 重新配置表结构，成功时清空所有键
    ///
    /// 配置非法时保留原有表。
    pub fn reconfigure(&mut self, config: CuckooMapConfig) -> Result<(), CuckooError> {
        if self.in_flight.is_some() {
            return Err(self.reject(OperationType::Reconfigure, CuckooError::InsertInProgress));
        }
        if let Err(e) = config.validate() {
            log_warn!("reconfigure rejected: {}", e);
            return Err(self.reject(OperationType::Reconfigure, e));
        }

        log_info!(
            "tables refreshed {} x {} -> {} x {}",
            self.config.tables, self.config.rows, config.tables, config.rows
        );
        self.tables = TableSet::new(config.tables, config.rows);
        self.hasher.update_rows(config.rows);
        self.last_collision_depth = 0;
        self.config = config;
        self.stats_recorder.record_operation(OperationType::Reconfigure, true);
        self.emit(Notification::success(format!(
            "Tables refreshed: {} x {}",
            self.config.tables, self.config.rows
        )));
        Ok(())
    }

    /// 清空所有键，保持当前形状
    pub fn clear(&mut self) -> Result<(), CuckooError> {
        self.reconfigure(self.config.clone())
    }

    /// 获取统计信息
    pub fn stats(&self) -> CuckooMapStats {
        let total = load::total(&self.tables);
        CuckooMapStats {
            size: total.used,
            capacity: total.capacity,
            load_factor: total.ratio(),
            last_collision_depth: self.last_collision_depth,
            operations: self.stats_recorder.snapshot(),
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        self.stats_recorder.export_prometheus()
    }

    fn reject(&self, op_type: OperationType, error: CuckooError) -> CuckooError {
        self.stats_recorder.record_operation(op_type, false);
        self.emit(Notification::error(error_message(&error)));
        error
    }

    fn emit(&self, notification: Notification) {
        notification.dispatch(self.events.as_ref());
    }
}

impl fmt::Debug for CuckooMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("CuckooMap")
            .field("tables", &self.config.tables)
            .field("rows", &self.config.rows)
            .field("size", &stats.size)
            .field("load_factor", &stats.load_factor)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}
