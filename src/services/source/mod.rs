// ソース機能
// イテレーターやディレクトリ走査を遅延シーケンスとして提供

pub mod implementations;

// 公開API
pub use implementations::{FallibleIterSource, IterSource, WalkDirSource};
