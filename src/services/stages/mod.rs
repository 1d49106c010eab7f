// ステージ機能
// 汎用ステージとファイルダイジェスト用ステージ

pub mod digest;
pub mod implementations;

// 公開API
pub use digest::{fnv1a_64, FileDigest, FileDigestStage, FileTask};
pub use implementations::{FnStage, IdentityStage};
