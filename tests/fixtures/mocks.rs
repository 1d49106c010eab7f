// 統合テスト用のモック実装

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;
use streamer::core::{ItemSource, PipelineStage};
use streamer::services::ReentrantHostLock;

/// ステージの呼び出し記録
#[derive(Debug, Default)]
pub struct StageCalls {
    pub stage1: AtomicUsize,
    pub stage2: AtomicUsize,
    pub stage1_threads: parking_lot::Mutex<HashSet<ThreadId>>,
    pub stage2_threads: parking_lot::Mutex<HashSet<ThreadId>>,
}

/// 呼び出し回数と実行スレッドを記録するステージ
#[derive(Debug, Default, Clone)]
pub struct RecordingStage {
    calls: Arc<StageCalls>,
    delay: Duration,
}

impl RecordingStage {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Arc<StageCalls> {
        Arc::clone(&self.calls)
    }
}

impl PipelineStage for RecordingStage {
    type Input = u32;
    type Task = u32;
    type Output = u32;

    fn stage1(&self, item: u32) -> u32 {
        self.calls.stage1.fetch_add(1, Ordering::SeqCst);
        self.calls.stage1_threads.lock().insert(thread::current().id());
        item
    }

    fn stage2(&self, task: u32) -> u32 {
        self.calls.stage2.fetch_add(1, Ordering::SeqCst);
        self.calls.stage2_threads.lock().insert(thread::current().id());
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        task
    }
}

/// 指定位置で失敗するソース
pub struct FailingSource {
    next: u32,
    fail_at: u32,
}

impl FailingSource {
    pub fn new(fail_at: u32) -> Self {
        Self { next: 0, fail_at }
    }
}

impl ItemSource for FailingSource {
    type Item = u32;

    fn next_item(&mut self) -> anyhow::Result<Option<u32>> {
        if self.next == self.fail_at {
            anyhow::bail!("source failed at {}", self.fail_at);
        }
        self.next += 1;
        Ok(Some(self.next - 1))
    }
}

/// ホストロック保持中にのみ呼び出せるソース（インタプリタ所有のジェネレーター相当）
pub struct HostOwnedSource {
    lock: Arc<ReentrantHostLock>,
    remaining: std::ops::Range<u32>,
    pub violations: Arc<AtomicUsize>,
}

impl HostOwnedSource {
    pub fn new(lock: Arc<ReentrantHostLock>, items: std::ops::Range<u32>) -> Self {
        Self {
            lock,
            remaining: items,
            violations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ItemSource for HostOwnedSource {
    type Item = u32;

    fn next_item(&mut self) -> anyhow::Result<Option<u32>> {
        if !self.lock.is_held_by_current_thread() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.remaining.next())
    }
}

impl Drop for HostOwnedSource {
    fn drop(&mut self) {
        if !self.lock.is_held_by_current_thread() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// ホストロック外で実行されていることを検査するステージ
pub struct LockFreeStage {
    pub lock: Arc<ReentrantHostLock>,
    pub violations: Arc<AtomicUsize>,
}

impl PipelineStage for LockFreeStage {
    type Input = u32;
    type Task = u32;
    type Output = u32;

    fn stage1(&self, item: u32) -> u32 {
        if self.lock.is_held_by_current_thread() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        item * 2
    }

    fn stage2(&self, task: u32) -> u32 {
        if self.lock.is_held_by_current_thread() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        task + 1
    }
}
