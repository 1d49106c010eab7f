// パイプライン処理のカスタムエラー型定義

use thiserror::Error;

/// ストリーマー固有のエラー型
#[derive(Error, Debug)]
pub enum StreamerError {
    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("スレッド起動エラー: {role} - {source}")]
    ThreadSpawnError {
        role: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ソースエラー: {source}")]
    SourceError {
        #[source]
        source: anyhow::Error,
    },

    #[error("スレッドがパニックしました: {role}")]
    ThreadPanicked { role: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("I/Oエラー: {path} - {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// ストリーマー処理の結果型
pub type StreamerResult<T> = Result<T, StreamerError>;

impl StreamerError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// スレッド起動エラーの作成
    pub fn thread_spawn(role: impl Into<String>, source: std::io::Error) -> Self {
        Self::ThreadSpawnError {
            role: role.into(),
            source,
        }
    }

    /// ソースエラーの作成
    pub fn source(source: anyhow::Error) -> Self {
        Self::SourceError { source }
    }

    /// スレッドパニックエラーの作成
    pub fn thread_panicked(role: impl Into<String>) -> Self {
        Self::ThreadPanicked { role: role.into() }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// I/Oエラーの作成
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// ソース側の失敗とI/Oエラーは呼び出し側で再実行できるが、
    /// 設定ミスやスレッドの異常終了はそのままでは回復できない。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ConfigurationError { .. } => false,
            Self::ThreadSpawnError { .. } => true,
            Self::SourceError { .. } => true,
            Self::ThreadPanicked { .. } => false,
            Self::TaskError { .. } => false,
            Self::IoError { .. } => true,
        }
    }
}
