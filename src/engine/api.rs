// 高レベル公開API
// Streamerを簡単に使用できるようにするための便利な関数

use super::Streamer;
use crate::{
    core::{
        HostLock, ItemSource, PipelineConfig, PipelineStage, ProgressReporter, StreamSummary,
        StreamerResult,
    },
    services::{
        DefaultPipelineConfig, IterSource, LogProgressReporter, NoHostLock, NoOpProgressReporter,
    },
};
use std::sync::Arc;

/// イテレーターをソースとしてStreamerを作成
///
/// ホストロックなし・進捗報告なしの最小構成
pub fn stream_iter<I, S>(
    items: I,
    stage: S,
    workers: usize,
    queue_depth: usize,
) -> StreamerResult<Streamer<S, NoHostLock, NoOpProgressReporter>>
where
    I: IntoIterator<Item = S::Input>,
    I::IntoIter: Send + 'static,
    S: PipelineStage + 'static,
    S::Input: 'static,
{
    let config = DefaultPipelineConfig::new(1)
        .with_workers(workers)
        .with_queue_depth(queue_depth)
        .with_progress_reporting(false);

    Streamer::new(
        IterSource::new(items),
        stage,
        Arc::new(NoHostLock),
        &config,
        NoOpProgressReporter::new(),
    )
}

/// 設定に従ってStreamerを作成
///
/// 進捗報告が無効な設定では失敗のみを報告する
pub fn stream_with_config<Src, S, C>(
    source: Src,
    stage: S,
    config: &C,
) -> StreamerResult<Streamer<S, NoHostLock, LogProgressReporter>>
where
    Src: ItemSource<Item = S::Input> + 'static,
    S: PipelineStage + 'static,
    C: PipelineConfig + ?Sized,
{
    let reporter = if config.enable_progress_reporting() {
        LogProgressReporter::new()
    } else {
        LogProgressReporter::quiet()
    };

    Streamer::new(source, stage, Arc::new(NoHostLock), config, reporter)
}

/// 終端まで全ての結果を取り出してからStreamerを閉じる
///
/// ソース側の失敗は `SourceError` として返す。
pub fn collect_all<S, L, R>(
    streamer: Streamer<S, L, R>,
) -> StreamerResult<(Vec<S::Output>, StreamSummary)>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    let mut results = Vec::new();
    while let Some(item) = streamer.try_pull()? {
        results.push(item);
    }
    let summary = streamer.close()?;
    Ok((results, summary))
}
