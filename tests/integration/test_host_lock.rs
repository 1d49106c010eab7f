// ホストロック連携の統合テスト
use crate::fixtures::{HostOwnedSource, LockFreeStage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use streamer::{
    services::{DefaultPipelineConfig, FnStage, NoOpProgressReporter, ReentrantHostLock},
    HostLock, HostLockGuard, Streamer, StreamerError,
};

fn config(workers: usize, depth: usize) -> DefaultPipelineConfig {
    DefaultPipelineConfig::new(workers)
        .with_queue_depth(depth)
        .with_progress_reporting(false)
}

#[test]
fn test_consumer_holding_host_lock_still_makes_progress() {
    let lock = Arc::new(ReentrantHostLock::new());
    let violations = Arc::new(AtomicUsize::new(0));
    let source = HostOwnedSource::new(Arc::clone(&lock), 0..20);
    let source_violations = Arc::clone(&source.violations);

    // 消費側は常にホストロックを保持した状態で呼び出す
    let _held = HostLockGuard::new(lock.as_ref());

    let streamer = Streamer::new(
        source,
        LockFreeStage {
            lock: Arc::clone(&lock),
            violations: Arc::clone(&violations),
        },
        Arc::clone(&lock),
        &config(3, 2),
        NoOpProgressReporter::new(),
    )
    .unwrap();

    let mut results: Vec<u32> = Vec::new();
    while let Some(item) = streamer.pull() {
        assert!(lock.is_held_by_current_thread());
        results.push(item);
    }
    results.sort_unstable();

    streamer.close().unwrap();

    assert!(lock.is_held_by_current_thread());
    assert_eq!(lock.depth(), 1);
    assert_eq!(results, (0..20).map(|x| x * 2 + 1).collect::<Vec<u32>>());
    assert_eq!(violations.load(Ordering::SeqCst), 0);
    assert_eq!(source_violations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_other_host_threads_run_while_consumer_waits() {
    let lock = Arc::new(ReentrantHostLock::new());
    let stop = Arc::new(AtomicBool::new(false));
    let ticks = Arc::new(AtomicUsize::new(0));

    // 別のホストスレッド: ロックを取っては手放すだけ
    let background = {
        let lock = Arc::clone(&lock);
        let stop = Arc::clone(&stop);
        let ticks = Arc::clone(&ticks);
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                lock.acquire();
                ticks.fetch_add(1, Ordering::SeqCst);
                lock.release();
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    lock.acquire();
    lock.acquire();
    let source = HostOwnedSource::new(Arc::clone(&lock), 0..10);
    let streamer = Streamer::new(
        source,
        LockFreeStage {
            lock: Arc::clone(&lock),
            violations: Arc::new(AtomicUsize::new(0)),
        },
        Arc::clone(&lock),
        &config(2, 1),
        NoOpProgressReporter::new(),
    )
    .unwrap();

    let delivered = std::iter::from_fn(|| streamer.pull()).count();
    drop(streamer);

    assert_eq!(delivered, 10);
    assert_eq!(lock.depth(), 2);
    lock.release();
    lock.release();

    stop.store(true, Ordering::SeqCst);
    background.join().unwrap();
    assert!(ticks.load(Ordering::SeqCst) > 0);
}

#[test]
fn test_drop_under_host_lock_with_blocked_producer() {
    let lock = Arc::new(ReentrantHostLock::new());
    let source = HostOwnedSource::new(Arc::clone(&lock), 0..10_000);
    let violations = Arc::clone(&source.violations);

    let _held = HostLockGuard::new(lock.as_ref());
    let streamer = Streamer::new(
        source,
        LockFreeStage {
            lock: Arc::clone(&lock),
            violations: Arc::new(AtomicUsize::new(0)),
        },
        Arc::clone(&lock),
        &config(2, 2),
        NoOpProgressReporter::new(),
    )
    .unwrap();

    assert!(streamer.pull().is_some());
    let summary = streamer.close().unwrap();

    assert_eq!(summary.delivered, 1);
    assert!(lock.is_held_by_current_thread());
    assert_eq!(violations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_stage1_drops_source_under_host_lock() {
    let lock = Arc::new(ReentrantHostLock::new());
    let source = HostOwnedSource::new(Arc::clone(&lock), 0..100);
    let violations = Arc::clone(&source.violations);

    let stage = FnStage::new(
        |item: u32| {
            if item == 5 {
                panic!("stage1 failed on {item}");
            }
            item
        },
        |task: u32| task,
    );

    let _held = HostLockGuard::new(lock.as_ref());
    let streamer = Streamer::new(
        source,
        stage,
        Arc::clone(&lock),
        &config(2, 2),
        NoOpProgressReporter::new(),
    )
    .unwrap();

    let delivered: Vec<u32> = std::iter::from_fn(|| streamer.pull()).collect();
    let error = streamer.close().unwrap_err();

    assert_eq!(delivered.len(), 5);
    assert!(matches!(error, StreamerError::ThreadPanicked { .. }));
    assert_eq!(violations.load(Ordering::SeqCst), 0);
    assert!(lock.is_held_by_current_thread());
}
