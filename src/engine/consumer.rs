// Consumer - 入力キューからタスクを取り出し stage2 を適用する並列ワーカー

use super::{queue::FinishGuard, BoundedQueue, SharedState};
use crate::core::{PipelineStage, ProgressReporter, ThreadRole};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// ワーカープール起動の失敗
///
/// 起動済みのスレッドは `spawned` に残る。起動できなかったワーカーの分の
/// 出力キュー `finish` は呼び出し済み。
#[derive(Debug)]
pub struct SpawnFailure {
    pub spawned: Vec<JoinHandle<()>>,
    pub role: ThreadRole,
    pub error: std::io::Error,
}

/// 単一ワーカー
///
/// 入力キューが終端に達するまで処理し、終了時（パニック含む）に
/// 出力キューの `finish` を一度だけ呼ぶ。
pub fn spawn_worker<S, R>(
    worker_id: usize,
    stage: Arc<S>,
    input: Arc<BoundedQueue<S::Task>>,
    output: Arc<BoundedQueue<S::Output>>,
    shared: Arc<SharedState>,
    reporter: Arc<R>,
) -> std::io::Result<JoinHandle<()>>
where
    S: PipelineStage + 'static,
    R: ProgressReporter + 'static,
{
    thread::Builder::new()
        .name(ThreadRole::Worker(worker_id).to_string())
        .spawn(move || {
            let _finish = FinishGuard::new(output.as_ref());
            let mut processed = 0usize;

            while let Some(task) = input.dequeue() {
                let result = stage.stage2(task);
                output.enqueue(result);
                shared.record_processed();
                processed += 1;
            }

            log::debug!("Worker {worker_id} finished after {processed} items");
            reporter.report_worker_finished(worker_id, processed);
        })
}

/// Workers: 固定数のワーカープール
///
/// 出力キューのプロデューサー数は `worker_count` と一致している必要がある。
pub fn spawn_workers<S, R>(
    worker_count: usize,
    stage: &Arc<S>,
    input: &Arc<BoundedQueue<S::Task>>,
    output: &Arc<BoundedQueue<S::Output>>,
    shared: &Arc<SharedState>,
    reporter: &Arc<R>,
) -> Result<Vec<JoinHandle<()>>, SpawnFailure>
where
    S: PipelineStage + 'static,
    R: ProgressReporter + 'static,
{
    let mut handles = Vec::with_capacity(worker_count);

    for worker_id in 0..worker_count {
        let spawned = spawn_worker(
            worker_id,
            Arc::clone(stage),
            Arc::clone(input),
            Arc::clone(output),
            Arc::clone(shared),
            Arc::clone(reporter),
        );

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(error) => {
                // 起動できなかったワーカーの完了を代わりに通知する
                for _ in worker_id..worker_count {
                    output.finish();
                }
                return Err(SpawnFailure {
                    spawned: handles,
                    role: ThreadRole::Worker(worker_id),
                    error,
                });
            }
        }
    }

    Ok(handles)
}
