// 設定管理の具象実装

use crate::core::PipelineConfig;

/// キュー深さのデフォルト値
pub const DEFAULT_QUEUE_DEPTH: usize = 128;

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultPipelineConfig {
    workers: usize,
    queue_depth: usize,
    enable_progress: bool,
}

impl DefaultPipelineConfig {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            workers: cpu_count.max(1),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            enable_progress: true,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}
