// ホストロックの具象実装

use crate::core::HostLock;
use parking_lot::{Condvar, Mutex};
use std::thread::{self, ThreadId};

/// ホストランタイムを持たない場合のロック（何もしない）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHostLock;

impl NoHostLock {
    pub fn new() -> Self {
        Self
    }
}

impl HostLock for NoHostLock {
    fn acquire(&self) {}

    fn release(&self) {}

    fn suspend(&self) -> usize {
        0
    }

    fn resume(&self, _depth: usize) {}
}

#[derive(Debug, Default)]
struct OwnerState {
    owner: Option<ThreadId>,
    depth: usize,
}

/// 再入可能なホストロック
///
/// 単一スレッド前提のランタイム（GIL等）の境界をモデル化したもの。
/// 所有スレッドと再入段数を保持し、`suspend`/`resume` で全段をまとめて
/// 手放し・再取得できる。
#[derive(Debug, Default)]
pub struct ReentrantHostLock {
    state: Mutex<OwnerState>,
    released: Condvar,
}

impl ReentrantHostLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のスレッドが保持しているか
    pub fn is_held_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    /// 現在のスレッドが保持している段数（他スレッド所有なら0）
    pub fn depth(&self) -> usize {
        let state = self.state.lock();
        if state.owner == Some(thread::current().id()) {
            state.depth
        } else {
            0
        }
    }

    fn lock_with_depth(&self, depth: usize) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner == Some(me) {
            state.depth += depth;
            return;
        }
        while state.owner.is_some() {
            self.released.wait(&mut state);
        }
        state.owner = Some(me);
        state.depth = depth;
    }
}

impl HostLock for ReentrantHostLock {
    fn acquire(&self) {
        self.lock_with_depth(1);
    }

    fn release(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            log::warn!("ReentrantHostLock::release called by a thread that does not hold it");
            return;
        }

        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_one();
        }
    }

    fn suspend(&self) -> usize {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            return 0;
        }

        let depth = std::mem::take(&mut state.depth);
        state.owner = None;
        drop(state);
        self.released.notify_one();
        depth
    }

    fn resume(&self, depth: usize) {
        if depth > 0 {
            self.lock_with_depth(depth);
        }
    }
}
