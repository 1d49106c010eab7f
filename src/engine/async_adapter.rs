// AsyncStreamer - 非同期ランタイムからStreamerを利用するためのアダプター
// ブロッキングの pull を spawn_blocking に逃がし、実行器を止めない

use super::Streamer;
use crate::core::{
    HostLock, PipelineStage, ProgressReporter, StreamSummary, StreamerError, StreamerResult,
};
use std::sync::Arc;

/// 非同期版Streamer
///
/// `next` の Future を途中で破棄した場合、その呼び出しが取り出した要素は失われる。
pub struct AsyncStreamer<S, L, R>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    inner: Arc<Streamer<S, L, R>>,
}

impl<S, L, R> AsyncStreamer<S, L, R>
where
    S: PipelineStage + 'static,
    S::Output: 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    pub fn new(streamer: Streamer<S, L, R>) -> Self {
        Self {
            inner: Arc::new(streamer),
        }
    }

    /// 次の結果を待つ（`None` は終端）
    pub async fn next(&self) -> StreamerResult<Option<S::Output>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.pull())
            .await
            .map_err(StreamerError::task)
    }

    /// ソース側の失敗を区別する `next`
    pub async fn try_next(&self) -> StreamerResult<Option<S::Output>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.try_pull())
            .await
            .map_err(StreamerError::task)?
    }

    pub fn stats(&self) -> StreamSummary {
        self.inner.stats()
    }

    /// ブロッキングスレッド上でStreamerを閉じる
    ///
    /// 破棄された `next` のブロッキングタスクが残っていても、キューの中断で
    /// 起こしてから全スレッドを join する。
    pub async fn close(self) -> StreamerResult<StreamSummary> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || inner.shutdown())
            .await
            .map_err(StreamerError::task)?
    }
}
