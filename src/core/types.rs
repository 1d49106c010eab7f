// パイプラインに関連するデータ型定義

use chrono::{DateTime, Utc};
use std::fmt;

/// パイプライン全体のサマリー
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StreamSummary {
    pub started_at: DateTime<Utc>,
    pub workers: usize,
    pub queue_depth: usize,
    /// stage1 を通過して入力キューへ投入された件数
    pub produced: usize,
    /// stage2 を通過して出力キューへ投入された件数
    pub processed: usize,
    /// コンシューマーへ引き渡された件数
    pub delivered: usize,
    pub source_error: Option<String>,
    pub elapsed_ms: u64,
}

impl StreamSummary {
    /// 取り出されずに破棄された件数
    pub fn discarded(&self) -> usize {
        self.produced.saturating_sub(self.delivered)
    }
}

/// パイプライン内のスレッドの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadRole {
    Producer,
    Worker(usize),
}

impl fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => write!(f, "streamer-producer"),
            Self::Worker(id) => write!(f, "streamer-worker-{id}"),
        }
    }
}
