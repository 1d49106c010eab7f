// パイプラインの協調者トレイト定義
// ソース、ステージ、ホストロック、設定、進捗報告の抽象化インターフェース

use super::types::StreamSummary;
use anyhow::Result;
use mockall::automock;

/// 外部の逐次ソースを抽象化するトレイト
///
/// `Ok(Some(item))` は次の要素、`Ok(None)` は枯渇、`Err` はソース側の失敗を表す。
/// 呼び出しはプロデューサースレッド上でホストロック保持中に行われる。
#[automock(type Item = i32;)]
pub trait ItemSource: Send {
    type Item: Send;

    /// 次の要素を取り出す
    fn next_item(&mut self) -> Result<Option<Self::Item>>;
}

/// 二段階変換を提供するパイプラインステージ
///
/// `stage1` はプロデューサースレッドで、`stage2` はワーカースレッドで呼ばれる。
/// どちらもエンジンのホストロック外で実行されるため、
/// ホスト所有の値に触れる実装は自分でロックを取得すること。
#[automock(type Input = i32; type Task = i32; type Output = i32;)]
pub trait PipelineStage: Send + Sync {
    type Input: Send;
    type Task: Send;
    type Output: Send;

    /// ソース要素からタスクを作成
    fn stage1(&self, item: Self::Input) -> Self::Task;

    /// タスクから結果を作成
    fn stage2(&self, task: Self::Task) -> Self::Output;
}

/// ホストランタイムのロック（GIL相当）を抽象化するトレイト
///
/// 再入可能で、任意のスレッドから利用できること。
#[automock]
pub trait HostLock: Send + Sync {
    /// 現在のスレッドでロックを取得（再入可）
    fn acquire(&self);

    /// `acquire` 一回分を解放
    fn release(&self);

    /// 現在のスレッドが保持している全段を解放し、解放した段数を返す
    fn suspend(&self) -> usize;

    /// `suspend` が返した段数まで再取得
    fn resume(&self, depth: usize);
}

// HostLock for Box<dyn HostLock>
impl HostLock for Box<dyn HostLock> {
    fn acquire(&self) {
        self.as_ref().acquire()
    }

    fn release(&self) {
        self.as_ref().release()
    }

    fn suspend(&self) -> usize {
        self.as_ref().suspend()
    }

    fn resume(&self, depth: usize) {
        self.as_ref().resume(depth)
    }
}

/// スコープ付きのホストロック取得
///
/// 生成時に `acquire`、ドロップ時に `release` する。
#[must_use = "ガードを破棄するとすぐにロックが解放されます"]
pub struct HostLockGuard<'a, L: HostLock + ?Sized> {
    lock: &'a L,
}

impl<'a, L: HostLock + ?Sized> HostLockGuard<'a, L> {
    pub fn new(lock: &'a L) -> Self {
        lock.acquire();
        Self { lock }
    }
}

impl<L: HostLock + ?Sized> Drop for HostLockGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

struct SuspendGuard<'a, L: HostLock + ?Sized> {
    lock: &'a L,
    depth: usize,
}

impl<L: HostLock + ?Sized> Drop for SuspendGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.resume(self.depth);
    }
}

/// ホストロックを一時的に手放して `f` を実行する
///
/// `f` がパニックした場合でも元の段数まで再取得される。
pub fn allow_threads<L, R>(lock: &L, f: impl FnOnce() -> R) -> R
where
    L: HostLock + ?Sized,
{
    let _guard = SuspendGuard {
        lock,
        depth: lock.suspend(),
    };
    f()
}

/// パイプライン設定を抽象化するトレイト
#[automock]
pub trait PipelineConfig: Send + Sync {
    /// ワーカースレッド数
    fn worker_count(&self) -> usize;

    /// 入力・出力キューの深さ
    fn queue_depth(&self) -> usize;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

// PipelineConfig for Box<dyn PipelineConfig>
impl PipelineConfig for Box<dyn PipelineConfig> {
    fn worker_count(&self) -> usize {
        self.as_ref().worker_count()
    }

    fn queue_depth(&self) -> usize {
        self.as_ref().queue_depth()
    }

    fn enable_progress_reporting(&self) -> bool {
        self.as_ref().enable_progress_reporting()
    }
}

/// 進捗報告の抽象化トレイト
///
/// プロデューサー・ワーカーの各スレッドから呼ばれるため、短時間で戻ること。
#[automock]
pub trait ProgressReporter: Send + Sync {
    /// パイプライン起動時の報告
    fn report_started(&self, workers: usize, queue_depth: usize);

    /// ソース側の失敗の報告
    fn report_source_error(&self, error: &str);

    /// プロデューサー終了時の報告
    fn report_source_finished(&self, produced: usize);

    /// ワーカー終了時の報告
    fn report_worker_finished(&self, worker_id: usize, processed: usize);

    /// パイプライン終了時の報告
    fn report_completed(&self, summary: &StreamSummary);
}

// ProgressReporter for Box<dyn ProgressReporter>
impl ProgressReporter for Box<dyn ProgressReporter> {
    fn report_started(&self, workers: usize, queue_depth: usize) {
        self.as_ref().report_started(workers, queue_depth)
    }

    fn report_source_error(&self, error: &str) {
        self.as_ref().report_source_error(error)
    }

    fn report_source_finished(&self, produced: usize) {
        self.as_ref().report_source_finished(produced)
    }

    fn report_worker_finished(&self, worker_id: usize, processed: usize) {
        self.as_ref().report_worker_finished(worker_id, processed)
    }

    fn report_completed(&self, summary: &StreamSummary) {
        self.as_ref().report_completed(summary)
    }
}
