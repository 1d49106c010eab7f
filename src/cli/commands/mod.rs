pub mod digest;
pub mod range;

pub use digest::*;
pub use range::*;

use crate::services::DefaultPipelineConfig;

/// コマンドライン引数からパイプライン設定を構築
pub(crate) fn pipeline_config(workers: Option<usize>, depth: usize) -> DefaultPipelineConfig {
    let config = DefaultPipelineConfig::default().with_queue_depth(depth);
    match workers {
        Some(workers) => config.with_workers(workers),
        None => config,
    }
}
