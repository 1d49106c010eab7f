// サービス層 - パイプラインの協調者の具象実装
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod config;
pub mod host_lock;
pub mod monitoring;
pub mod source;
pub mod stages;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::DefaultPipelineConfig;
pub use host_lock::{NoHostLock, ReentrantHostLock};
pub use monitoring::{LogProgressReporter, NoOpProgressReporter};
pub use source::{FallibleIterSource, IterSource, WalkDirSource};
pub use stages::{fnv1a_64, FileDigest, FileDigestStage, FileTask, FnStage, IdentityStage};
