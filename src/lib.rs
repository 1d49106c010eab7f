//! 有界キューで接続されたプロデューサー・ワーカープールによるストリーミング処理
//!
//! 遅延ソースから要素を取り出し、`stage1` を専用スレッドで、`stage2` を
//! 固定数のワーカースレッドで適用し、呼び出し側に結果を逐次返す。
//! 結果の順序はワーカーが1つの場合のみ保証される。

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;

pub use crate::core::{
    allow_threads, HostLock, HostLockGuard, ItemSource, PipelineConfig, PipelineStage,
    ProgressReporter, StreamSummary, StreamerError, StreamerResult, ThreadRole,
};
pub use crate::engine::{
    collect_all, stream_iter, stream_with_config, AsyncStreamer, BoundedQueue, Streamer,
};
