// ファイルダイジェストステージ
// stage1 でファイルを読み込み、stage2 でFNV-1aダイジェストを計算する

use crate::core::PipelineStage;
use std::path::PathBuf;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64ビットFNV-1aハッシュ
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// 読み込み済みファイル
#[derive(Debug)]
pub struct FileTask {
    pub path: PathBuf,
    pub contents: std::io::Result<Vec<u8>>,
}

/// 1ファイル分のダイジェスト結果
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileDigest {
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// ファイル内容のダイジェストを計算するステージ
#[derive(Debug, Default, Clone)]
pub struct FileDigestStage;

impl FileDigestStage {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStage for FileDigestStage {
    type Input = PathBuf;
    type Task = FileTask;
    type Output = FileDigest;

    fn stage1(&self, path: PathBuf) -> FileTask {
        let contents = std::fs::read(&path);
        FileTask { path, contents }
    }

    fn stage2(&self, task: FileTask) -> FileDigest {
        let path = task.path.display().to_string();
        match task.contents {
            Ok(bytes) => FileDigest {
                path,
                size: bytes.len() as u64,
                digest: Some(hex::encode(fnv1a_64(&bytes).to_be_bytes())),
                error: None,
            },
            Err(e) => FileDigest {
                path,
                size: 0,
                digest: None,
                error: Some(e.to_string()),
            },
        }
    }
}
