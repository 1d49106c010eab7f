// 進捗監視の具象実装

use crate::core::{ProgressReporter, StreamSummary};

/// logクレート経由の進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct LogProgressReporter {
    quiet: bool,
}

impl LogProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 失敗だけを報告するモード
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report_started(&self, workers: usize, queue_depth: usize) {
        if !self.quiet {
            log::info!("Starting stream with {workers} workers (queue depth {queue_depth})");
        }
    }

    fn report_source_error(&self, error: &str) {
        log::warn!("Source stopped with an error: {error}");
    }

    fn report_source_finished(&self, produced: usize) {
        if !self.quiet {
            log::info!("Source exhausted after {produced} items");
        }
    }

    fn report_worker_finished(&self, worker_id: usize, processed: usize) {
        if !self.quiet {
            log::debug!("Worker {worker_id} finished after {processed} items");
        }
    }

    fn report_completed(&self, summary: &StreamSummary) {
        if !self.quiet {
            log::info!(
                "Stream completed: produced {}, processed {}, delivered {} in {}ms",
                summary.produced,
                summary.processed,
                summary.delivered,
                summary.elapsed_ms
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NoOpProgressReporter {
    fn report_started(&self, _workers: usize, _queue_depth: usize) {}

    fn report_source_error(&self, _error: &str) {}

    fn report_source_finished(&self, _produced: usize) {}

    fn report_worker_finished(&self, _worker_id: usize, _processed: usize) {}

    fn report_completed(&self, _summary: &StreamSummary) {}
}
