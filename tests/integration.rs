//! Cuckoo哈希表集成测试

use cuckoo_tables::{
    log_info, slot_index, CuckooError, CuckooMap, CuckooMapConfig, CuckooSession, DeleteOutcome,
    InsertOutcome, Location, NotificationKind, RecordingEventSink, Slot, Step,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use test_log::test;

const SEED: u64 = 42;
const KEY_COUNT: usize = 200;
const ALPHABET: &[u8] = b"abcdefghij";

/// 生成随机短键（可能重复）
fn generate_keys(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(1..=6);
            (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect()
}

/// 创建测试用哈希表
fn create_test_map(tables: usize, rows: usize) -> (CuckooMap, Arc<RecordingEventSink>) {
    let sink = Arc::new(RecordingEventSink::new());
    let mut map = CuckooMap::new(CuckooMapConfig::new(tables, rows)).unwrap();
    map.set_event_sink(sink.clone());
    (map, sink)
}

#[test]
fn test_basic_functionality() {
    let (mut map, _sink) = create_test_map(3, 10);

    // 空表直接写入 T0
    assert_eq!(map.insert("cat"), InsertOutcome::Inserted { collision_depth: 0 });
    assert_eq!(map.tables().get(0, 6), Some(&Slot::Occupied("cat".into())));

    // 同一槽位，cat 被踢到 T1
    assert_eq!(map.insert("act"), InsertOutcome::Inserted { collision_depth: 1 });
    assert_eq!(map.tables().get(0, 6), Some(&Slot::Occupied("act".into())));
    assert_eq!(map.tables().get(1, 3), Some(&Slot::Occupied("cat".into())));
    assert_eq!(map.find("cat").unwrap(), Some(1));
    assert_eq!(map.find("act").unwrap(), Some(0));

    // 第三张表接住被踢出的键
    assert_eq!(map.insert("tac"), InsertOutcome::Inserted { collision_depth: 2 });
    assert_eq!(map.find("cat").unwrap(), Some(2));
    assert_eq!(
        map.tables().to_string(),
        "T0: - - - - - - tac - - -\nT1: - - - act - - - - - -\nT2: - - - - cat - - - - -\n"
    );
}

#[test]
fn test_cycle_with_two_tables() {
    let (mut map, sink) = create_test_map(2, 10);
    map.insert("cat");
    map.insert("act");
    sink.drain();

    let outcome = map.insert("tac");
    assert!(matches!(outcome, InsertOutcome::CycleDetected(_)));
    assert!(outcome.error().map(CuckooError::is_cycle).unwrap_or(false));
    assert_eq!(sink.last().unwrap().message, "Cycle present! Must rehash!");

    // 不回滚：写入过的位置保持最后的状态，键总数不变
    assert_eq!(map.len(), 2);
    assert_eq!(map.find("tac").unwrap(), None);
}

#[test]
fn test_duplicate_leaves_tables_unchanged() {
    let (mut map, sink) = create_test_map(3, 10);
    map.insert("cat");
    map.insert("act");
    let before = map.tables().clone();

    assert_eq!(
        map.insert("  cat "),
        InsertOutcome::Rejected(CuckooError::DuplicateKey { key: "cat".into() })
    );
    assert_eq!(map.tables(), &before);
    assert_eq!(sink.last().unwrap().message, "Value has already been added: cat");
}

#[test]
fn test_empty_key_rejected() {
    let (mut map, sink) = create_test_map(3, 10);
    assert!(matches!(map.insert("   "), InsertOutcome::Rejected(CuckooError::InvalidKey { .. })));
    assert!(map.is_empty());
    assert_eq!(sink.notifications().len(), 1);
    assert_eq!(sink.last().unwrap().kind, NotificationKind::Error);
}

#[test]
fn test_delete_then_find() {
    let (mut map, sink) = create_test_map(3, 10);
    map.insert("dog");
    assert_eq!(
        map.delete("dog").unwrap(),
        DeleteOutcome::Deleted(Location { table_index: 0, slot_index: 8 })
    );
    assert_eq!(map.find("dog").unwrap(), None);
    assert_eq!(map.delete("dog").unwrap(), DeleteOutcome::NotFound);
    assert_eq!(sink.last().unwrap().message, "Value not found: dog");
}

#[test]
fn test_invalid_reconfigure_keeps_tables() {
    let (mut map, _sink) = create_test_map(3, 10);
    map.insert("cat");
    let before = map.tables().clone();

    assert!(map.reconfigure(CuckooMapConfig::new(2, 9)).is_err());
    assert!(CuckooMapConfig::from_values(2.0, 9.5).is_err());
    assert_eq!(map.tables(), &before);

    map.reconfigure(CuckooMapConfig::from_values(5.0, 30.0).unwrap()).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.occupancy_all().len(), 5);
}

#[test]
fn test_hash_index_bounds() {
    assert_eq!(slot_index("cat", -1, 10), None);
    assert_eq!(slot_index("cat", 5, 10), None);
    assert_eq!(slot_index("cat", 0, 10), Some(6));
    assert!(slot_index("cat", 4, 30).is_some());
}

#[test]
fn test_random_keys_keep_invariants() {
    for (tables, rows) in [(2, 10), (3, 10), (5, 30)] {
        let (mut map, sink) = create_test_map(tables, rows);
        let keys = generate_keys(KEY_COUNT);

        let mut inserted = 0;
        let mut cycles = 0;
        for key in &keys {
            match map.insert(key) {
                InsertOutcome::Inserted { .. } => inserted += 1,
                InsertOutcome::CycleDetected(_) => cycles += 1,
                InsertOutcome::Rejected(e) => assert!(matches!(e, CuckooError::DuplicateKey { .. })),
            }
        }
        log_info!("{}x{}: inserted={} cycles={}", tables, rows, inserted, cycles);

        // 每个键都在自己的候选槽位上
        for (t, s, key) in map.tables().occupied() {
            assert_eq!(map.candidates(key)[t], Some(s));
        }

        // 一次循环恰好丢失一个键，所以保存的键数等于成功插入数
        let used: usize = map.occupancy_all().iter().map(|o| o.used).sum();
        assert_eq!(used, inserted);
        assert_eq!(map.len(), inserted);

        // 每个操作恰好一个终结事件
        assert_eq!(sink.notifications().len(), KEY_COUNT);
        assert_eq!(map.stats().operations.cycle_count, cycles as u64);
    }
}

#[test]
fn test_stepwise_insert() {
    let (mut map, sink) = create_test_map(3, 10);
    map.insert("cat");
    map.insert("act");
    sink.drain();

    map.begin_insert("tac").unwrap();
    let mut rounds = 0;
    loop {
        match map.step().unwrap() {
            Step::Placed(kick) => {
                rounds += 1;
                assert_eq!(kick.round, rounds);
                // 逐轮之间表处于中间状态，可以读取
                assert!(map.occupancy(kick.table_index).unwrap().used >= 1);
            }
            Step::Completed(kick, outcome) => {
                rounds += 1;
                assert_eq!(kick.round, rounds);
                assert_eq!(outcome, InsertOutcome::Inserted { collision_depth: 2 });
                // 最后一轮写入后立即可以执行其他操作
                assert!(!map.is_busy());
                break;
            }
            Step::Finished(outcome) => panic!("unexpected finish without a write: {outcome:?}"),
        }
    }
    assert_eq!(rounds, 3);
    assert_eq!(sink.progress().len(), 3);
    assert_eq!(sink.notifications().len(), 1);
}

#[test]
fn test_concurrent_session() {
    let session = CuckooSession::new(CuckooMap::default()).with_step_delay(Duration::from_millis(1));
    let keys = generate_keys(40);

    let handles: Vec<_> = keys
        .chunks(10)
        .map(|chunk| {
            let session = session.clone();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                let mut inserted = 0;
                for key in &chunk {
                    // 有插入在进行时重试
                    loop {
                        match session.insert_paced(key) {
                            InsertOutcome::Rejected(CuckooError::InsertInProgress) => {
                                thread::sleep(Duration::from_millis(1))
                            }
                            InsertOutcome::Inserted { .. } => {
                                inserted += 1;
                                break;
                            }
                            _ => break,
                        }
                    }
                }
                inserted
            })
        })
        .collect();

    let inserted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(!session.is_busy());
    assert_eq!(session.with_map(|m| m.len()), inserted);
}
