// SharedState - スレッド間で共有するカウンターとソースエラー

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct SourceFailure {
    message: Option<String>,
    pending: Option<anyhow::Error>,
}

/// プロデューサー・ワーカー・コンシューマーが更新する共有状態
#[derive(Default)]
pub struct SharedState {
    produced: AtomicUsize,
    processed: AtomicUsize,
    delivered: AtomicUsize,
    failure: Mutex<SourceFailure>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_source_error(&self, error: anyhow::Error) {
        let mut failure = self.failure.lock();
        failure.message = Some(format!("{error:#}"));
        failure.pending = Some(error);
    }

    /// 未報告のソースエラーを一度だけ取り出す
    pub(crate) fn take_source_error(&self) -> Option<anyhow::Error> {
        self.failure.lock().pending.take()
    }

    pub fn source_error(&self) -> Option<String> {
        self.failure.lock().message.clone()
    }

    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}
