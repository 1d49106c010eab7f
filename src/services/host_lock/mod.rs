// ホストロック
// 外部ランタイムの境界を表すロックの実装

pub mod implementations;

// 公開API
pub use implementations::{NoHostLock, ReentrantHostLock};
