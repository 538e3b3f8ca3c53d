//! 踢出引擎 - 插入时沿踢出路径逐轮置换
//!
//! 每次顶层插入对应一个 [`PendingInsert`]，它是一个显式状态机：
//! `Placing -> Done | Cycle | Error`。可以用 [`PendingInsert::run`] 同步跑完，
//! 也可以由外部调度器反复调用 [`PendingInsert::step`]，每轮之间插入可见的延迟。
//!
//! 已写入的轮次不会回滚：后续轮次检测到循环或哈希错误时，表保持成功前缀
//! 写入后的状态，最后一个被踢出的键因此会从结构中消失。

use std::fmt;

use crate::{
    error::CuckooError,
    hash::strategy::HashStrategy,
    types::{normalize_key, Slot, SlotIndex, TableIndex},
};

use super::{lookup, table_set::TableSet};

/// 一次插入中出现过的 (表索引, 键) 序列，仅用于循环检测
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionChain {
    entries: Vec<(TableIndex, String)>,
}

impl EvictionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查 (表, 键) 是否已出现过
    pub fn contains(&self, table_index: TableIndex, key: &str) -> bool {
        self.entries.iter().any(|(t, k)| *t == table_index && k == key)
    }

    pub fn push(&mut self, table_index: TableIndex, key: String) {
        self.entries.push((table_index, key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableIndex, &str)> + '_ {
        self.entries.iter().map(|(t, k)| (*t, k.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// 插入状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertState {
    /// 准备把 `key` 放入 `table_index`，已累计 `depth` 次踢出
    Placing {
        table_index: TableIndex,
        key: String,
        depth: usize,
    },
    Done {
        collision_depth: usize,
    },
    Cycle(CuckooError),
    Error(CuckooError),
}

impl InsertState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InsertState::Placing { .. })
    }
}

/// 顶层插入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 插入成功，附带本次插入引发的踢出次数
    Inserted { collision_depth: usize },
    /// 键非法、重复或哈希失败
    Rejected(CuckooError),
    /// 重复的 (表, 键) 对或超过轮数上限
    CycleDetected(CuckooError),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }

    /// 转换为 `Result`，成功时给出踢出次数
    pub fn into_result(self) -> Result<usize, CuckooError> {
        match self {
            InsertOutcome::Inserted { collision_depth } => Ok(collision_depth),
            InsertOutcome::Rejected(e) | InsertOutcome::CycleDetected(e) => Err(e),
        }
    }

    pub fn error(&self) -> Option<&CuckooError> {
        match self {
            InsertOutcome::Inserted { .. } => None,
            InsertOutcome::Rejected(e) | InsertOutcome::CycleDetected(e) => Some(e),
        }
    }
}

/// 单轮置换的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickStep {
    /// 从 1 开始的轮次
    pub round: usize,
    pub table_index: TableIndex,
    pub slot_index: SlotIndex,
    /// 本轮写入的键
    pub key: String,
    /// 被踢出的键
    pub evicted: Option<String>,
    pub depth: usize,
}

impl fmt::Display for KickStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {}: {} -> T{}[{}]",
            self.round, self.key, self.table_index, self.slot_index
        )?;
        if let Some(evicted) = &self.evicted {
            write!(f, " (evicted {evicted})")?;
        }
        Ok(())
    }
}

/// `step` 的返回值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 完成了一轮写入，还有被踢出的键待放置
    Placed(KickStep),
    /// 最后一轮写入落在空槽位，插入随之结束
    Completed(KickStep, InsertOutcome),
    /// 状态机已结束，本次调用没有写入
    Finished(InsertOutcome),
}

impl Step {
    /// 本次调用写入的轮次
    pub fn kick(&self) -> Option<&KickStep> {
        match self {
            Step::Placed(kick) | Step::Completed(kick, _) => Some(kick),
            Step::Finished(_) => None,
        }
    }

    /// 终结结果，仍有待放置的键时为 `None`
    pub fn outcome(&self) -> Option<&InsertOutcome> {
        match self {
            Step::Placed(_) => None,
            Step::Completed(_, outcome) | Step::Finished(outcome) => Some(outcome),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }
}

/// 正在进行的插入
#[derive(Debug, Clone)]
pub struct PendingInsert {
    key: String,
    chain: EvictionChain,
    state: InsertState,
    rounds: usize,
    max_rounds: usize,
}

impl PendingInsert {
    /// 校验键并检查重复，成功后进入 `Placing` 状态
    ///
    /// 键先去掉首尾空白。重复检查只在这里做一次，之后被踢出的键不再复查。
    pub fn begin(
        tables: &TableSet,
        hasher: &dyn HashStrategy,
        raw_key: &str,
        max_rounds: usize,
    ) -> Result<Self, CuckooError> {
        let key = normalize_key(raw_key)?.to_string();
        if lookup::find(tables, hasher, &key)?.is_some() {
            return Err(CuckooError::DuplicateKey { key });
        }

        log_debug!("insert start: key={}, max_rounds={}", key, max_rounds);
        Ok(Self {
            state: InsertState::Placing {
                table_index: 0,
                key: key.clone(),
                depth: 0,
            },
            key,
            chain: EvictionChain::new(),
            rounds: 0,
            max_rounds,
        })
    }

    /// 顶层插入的键（已规整）
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &InsertState {
        &self.state
    }

    pub fn chain(&self) -> &EvictionChain {
        &self.chain
    }

    /// 已完成的写入轮数
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// 推进一轮
    ///
    /// 终态下重复调用总是返回同一个结果。
    pub fn step(&mut self, tables: &mut TableSet, hasher: &dyn HashStrategy) -> Step {
        let (table_index, key, depth) = match &self.state {
            InsertState::Placing { table_index, key, depth } => (*table_index, key.clone(), *depth),
            _ => return Step::Finished(self.outcome()),
        };

        if self.rounds >= self.max_rounds {
            log_warn!("kick path exceeded {} rounds: key={}", self.max_rounds, self.key);
            return self.finish(InsertState::Cycle(CuckooError::KickPathExceeded {
                limit: self.max_rounds,
            }));
        }

        let location = match lookup::locate(hasher, &key, table_index) {
            Ok(location) => location,
            Err(e) => {
                log_error!("hashing failed at round {}: key={}, table={}", self.rounds + 1, key, table_index);
                return self.finish(InsertState::Error(e));
            }
        };

        if self.chain.contains(table_index, &key) {
            log_warn!(
                "kick cycle detected at depth {}: key={}, table={}",
                depth, key, table_index
            );
            return self.finish(InsertState::Cycle(CuckooError::CycleDetected { table_index, key }));
        }
        self.chain.push(table_index, key.clone());

        let previous = match tables.set(table_index, location.slot_index, Slot::Occupied(key.clone())) {
            Ok(previous) => previous,
            Err(e) => return self.finish(InsertState::Error(e)),
        };
        self.rounds += 1;

        let evicted = match previous {
            Slot::Occupied(old) if old != key => Some(old),
            _ => None,
        };

        log_debug!(
            "round {}: key={} -> [{}, {}], evicted={:?}, depth={}",
            self.rounds, key, table_index, location.slot_index, evicted, depth
        );

        let next = match &evicted {
            Some(old) => InsertState::Placing {
                table_index: (table_index + 1) % tables.table_count(),
                key: old.clone(),
                depth: depth + 1,
            },
            None => InsertState::Done { collision_depth: depth },
        };
        let kick = KickStep {
            round: self.rounds,
            table_index,
            slot_index: location.slot_index,
            key,
            evicted,
            depth,
        };

        self.state = next;
        if self.state.is_terminal() {
            Step::Completed(kick, self.outcome())
        } else {
            Step::Placed(kick)
        }
    }

    /// 同步跑完整条踢出路径
    pub fn run(mut self, tables: &mut TableSet, hasher: &dyn HashStrategy) -> InsertOutcome {
        loop {
            match self.step(tables, hasher) {
                Step::Placed(_) => continue,
                Step::Completed(_, outcome) | Step::Finished(outcome) => return outcome,
            }
        }
    }

    /// 当前状态对应的结果，仅在终态下有意义
    pub fn outcome(&self) -> InsertOutcome {
        match &self.state {
            InsertState::Done { collision_depth } => InsertOutcome::Inserted {
                collision_depth: *collision_depth,
            },
            InsertState::Cycle(e) => InsertOutcome::CycleDetected(e.clone()),
            InsertState::Error(e) => InsertOutcome::Rejected(e.clone()),
            InsertState::Placing { .. } => InsertOutcome::Rejected(CuckooError::InsertInProgress),
        }
    }

    fn finish(&mut self, state: InsertState) -> Step {
        self.state = state;
        Step::Finished(self.outcome())
    }
}

/// 同步插入一个键
pub fn insert(
    tables: &mut TableSet,
    hasher: &dyn HashStrategy,
    raw_key: &str,
    max_rounds: usize,
) -> InsertOutcome {
    match PendingInsert::begin(tables, hasher, raw_key, max_rounds) {
        Ok(pending) => pending.run(tables, hasher),
        Err(e) => InsertOutcome::Rejected(e),
    }
}
