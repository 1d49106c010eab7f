// 進捗監視機能
// パイプラインの起動、ソース終了、ワーカー終了、完了の報告

pub mod implementations;

// 公開API
pub use implementations::{LogProgressReporter, NoOpProgressReporter};
