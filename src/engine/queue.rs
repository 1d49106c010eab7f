// BoundedQueue - 複数プロデューサー対応の有界ブロッキングキュー
//
// 容量とプロデューサー数は生成時に固定。全プロデューサーが finish() し、
// かつ空になったキューは以後ずっと「終端」を返し続ける。

use crate::core::{allow_threads, HostLock};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;

struct QueueState<T> {
    items: VecDeque<T>,
    finished: usize,
    aborted: bool,
    high_water_mark: usize,
}

/// 固定容量のスレッドセーフなFIFOキュー
///
/// `enqueue` は満杯の間、`dequeue` は空かつ未完了の間ブロックする。
/// 要素は投入・取り出しのどちらでもムーブで受け渡され、
/// キューが取り出し後に参照を保持することはない。
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    producers: usize,
}

impl<T> BoundedQueue<T> {
    /// 新しいキューを作成
    ///
    /// `producers` はそれぞれ一度だけ `finish` を呼ぶ論理プロデューサーの数。
    /// 容量・プロデューサー数の0は1に切り上げる。
    pub fn new(capacity: usize, producers: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                finished: 0,
                aborted: false,
                high_water_mark: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            producers: producers.max(1),
        }
    }

    /// 単一プロデューサーのキューを作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, 1)
    }

    /// 末尾に要素を追加（満杯の間はブロック）
    ///
    /// 中断済みのキューに渡された要素はロック外で破棄される。
    pub fn enqueue(&self, item: T) {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.aborted {
            self.not_full.wait(&mut state);
        }

        if state.aborted {
            drop(state);
            drop(item);
            return;
        }

        state.items.push_back(item);
        state.high_water_mark = state.high_water_mark.max(state.items.len());
        drop(state);
        self.not_empty.notify_one();
    }

    /// 先頭の要素を取り出す（空かつ未完了の間はブロック）
    ///
    /// 全プロデューサーが完了して空になった後は常に `None` を返す。
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        self.wait_for_item(&mut state);
        self.take_front(state)
    }

    /// ホストロックを手放した状態で待機する `dequeue`
    ///
    /// 呼び出しスレッドが保持しているホストロックの全段を待機中だけ解放し、
    /// 戻る前に元の段数まで再取得する。キューのロックを保持したまま
    /// ホストロックを待つことはない。
    pub fn dequeue_releasing<L>(&self, host_lock: &L) -> Option<T>
    where
        L: HostLock + ?Sized,
    {
        allow_threads(host_lock, || self.dequeue())
    }

    /// プロデューサー一つ分の完了を通知
    ///
    /// 完了数がプロデューサー数に達したら、待機中の全コンシューマーを起こす。
    pub fn finish(&self) {
        let mut state = self.state.lock();
        if state.finished < self.producers {
            state.finished += 1;
        } else {
            log::warn!(
                "BoundedQueue::finish called more than {} times",
                self.producers
            );
        }
        let all_finished = state.finished == self.producers;
        drop(state);

        if all_finished {
            self.not_empty.notify_all();
        }
    }

    /// 待機中の全スレッドを起こし、以後の投入・取り出しを打ち切る
    pub(crate) fn abort(&self) {
        self.state.lock().aborted = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    fn wait_for_item(&self, state: &mut MutexGuard<'_, QueueState<T>>) {
        while state.items.is_empty() && state.finished < self.producers && !state.aborted {
            self.not_empty.wait(state);
        }
    }

    fn take_front(&self, mut state: MutexGuard<'_, QueueState<T>>) -> Option<T> {
        if state.aborted {
            return None;
        }

        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn producers(&self) -> usize {
        self.producers
    }

    pub fn finished_producers(&self) -> usize {
        self.state.lock().finished
    }

    /// 全プロデューサーが完了し、かつ空であるか
    pub fn is_drained(&self) -> bool {
        let state = self.state.lock();
        state.items.is_empty() && state.finished >= self.producers
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    /// これまでに観測した最大の要素数
    pub fn high_water_mark(&self) -> usize {
        self.state.lock().high_water_mark
    }
}

/// ドロップ時に `finish` を呼ぶガード
///
/// スレッドがパニックで終了しても完了数が揃うようにする。
pub(crate) struct FinishGuard<'a, T> {
    queue: &'a BoundedQueue<T>,
}

impl<'a, T> FinishGuard<'a, T> {
    pub(crate) fn new(queue: &'a BoundedQueue<T>) -> Self {
        Self { queue }
    }
}

impl<T> Drop for FinishGuard<'_, T> {
    fn drop(&mut self) {
        self.queue.finish();
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("finished", &state.finished)
            .field("producers", &self.producers)
            .field("aborted", &state.aborted)
            .finish()
    }
}
