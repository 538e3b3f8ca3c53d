//! 会话 - 在多个调用方之间共享一张哈希表，并按固定节奏推进踢出路径
//!
//! 每一轮置换之间释放锁并等待 `step_delay`，展示层可以在此期间读取中间状态。
//! 进行中的插入不能取消；在它结束前到达的插入、删除、查找和重新配置会被拒绝，
//! 由调用方决定是否排队重试。
//!
//! 哈希表发出的事件先暂存，释放锁之后才转发给接收器，
//! 接收器可以在回调中再次访问会话。

use std::{sync::Arc, thread, time::Duration};

use parking_lot::Mutex;

use crate::{
    error::CuckooError,
    event::{BufferedEventSink, EventSink},
    map::{
        cuckoo_map::{CuckooMap, CuckooMapConfig},
        eviction::{InsertOutcome, Step},
        load::Occupancy,
        lookup::{DeleteOutcome, Location},
    },
};

/// 默认的每轮间隔
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(50);

/// 共享会话
#[derive(Clone)]
pub struct CuckooSession {
    inner: Arc<Mutex<CuckooMap>>,
    buffer: Arc<BufferedEventSink>,
    events: Arc<dyn EventSink>,
    step_delay: Duration,
}

impl CuckooSession {
    /// 接管哈希表，原有的事件接收器改为在锁外接收事件
    pub fn new(mut map: CuckooMap) -> Self {
        let events = map.event_sink();
        let buffer = Arc::new(BufferedEventSink::new());
        map.set_event_sink(buffer.clone());
        Self {
            inner: Arc::new(Mutex::new(map)),
            buffer,
            events,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    /// 设置每轮间隔
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// 立即跑完整条踢出路径
    pub fn insert(&self, key: &str) -> InsertOutcome {
        self.locked(|map| map.insert(key))
    }

    /// 逐轮插入，每轮之间释放锁并等待
    pub fn insert_paced(&self, key: &str) -> InsertOutcome {
        if let Err(e) = self.locked(|map| map.begin_insert(key)) {
            return InsertOutcome::Rejected(e);
        }
        loop {
            match self.locked(CuckooMap::step) {
                Ok(Step::Placed(_)) => thread::sleep(self.step_delay),
                Ok(Step::Completed(_, outcome)) | Ok(Step::Finished(outcome)) => return outcome,
                Err(e) => return InsertOutcome::Rejected(e),
            }
        }
    }

    pub fn delete(&self, key: &str) -> Result<DeleteOutcome, CuckooError> {
        self.locked(|map| map.delete(key))
    }

    pub fn search(&self, key: &str) -> Result<Option<Location>, CuckooError> {
        self.locked(|map| map.search(key))
    }

    pub fn reconfigure(&self, config: CuckooMapConfig) -> Result<(), CuckooError> {
        self.locked(|map| map.reconfigure(config))
    }

    pub fn occupancy_all(&self) -> Vec<Occupancy> {
        self.inner.lock().occupancy_all()
    }

    /// 是否有插入正在进行
    pub fn is_busy(&self) -> bool {
        self.inner.lock().is_busy()
    }

    /// 在锁内读取哈希表
    pub fn with_map<R>(&self, f: impl FnOnce(&CuckooMap) -> R) -> R {
        self.locked(|map| f(map))
    }

    /// 持锁执行，释放锁后再转发期间产生的事件
    fn locked<R>(&self, f: impl FnOnce(&mut CuckooMap) -> R) -> R {
        let (result, pending) = {
            let mut map = self.inner.lock();
            let result = f(&mut map);
            (result, self.buffer.take())
        };
        for event in &pending {
            event.dispatch(self.events.as_ref());
        }
        result
    }
}
