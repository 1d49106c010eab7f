// 設定管理
// ワーカー数・キュー深さ等のパイプライン設定

pub mod implementations;

// 公開API
pub use implementations::DefaultPipelineConfig;
