// エンジン層 - 有界キューとスレッドのオーケストレーション
// サービス層の協調者を組み合わせてパイプラインを構成

pub mod api;
pub mod async_adapter;
pub mod consumer;
pub mod producer;
pub mod queue;
mod shared;
pub mod streamer;

// 公開API - 主要エンジンクラス
pub use api::{collect_all, stream_iter, stream_with_config};
pub use async_adapter::AsyncStreamer;
pub use queue::BoundedQueue;
pub use shared::SharedState;
pub use streamer::Streamer;
