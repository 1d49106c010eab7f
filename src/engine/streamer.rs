// Streamer - プロデューサー1本とワーカープールを2本のキューで繋ぐオーケストレーター

use super::{consumer::spawn_workers, producer::spawn_producer, BoundedQueue, SharedState};
use crate::{
    core::{
        allow_threads, HostLock, ItemSource, PipelineConfig, PipelineStage, ProgressReporter,
        StreamSummary, StreamerError, StreamerResult, ThreadRole,
    },
    services::{NoHostLock, NoOpProgressReporter},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// 有界キューによるストリーミングパイプライン
///
/// 生成と同時にプロデューサー1本とワーカー `W` 本が起動する。
/// 入力キュー・出力キューはどちらも深さ `D` で、滞留する要素数は
/// おおよそ `2 * D + W` に抑えられる。
///
/// 出力順は `W == 1` のときだけソース順と一致する。
pub struct Streamer<S, L = NoHostLock, R = NoOpProgressReporter>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    input: Arc<BoundedQueue<S::Task>>,
    output: Arc<BoundedQueue<S::Output>>,
    host_lock: Arc<L>,
    shared: Arc<SharedState>,
    reporter: Arc<R>,
    producer: Mutex<Option<JoinHandle<()>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    queue_depth: usize,
    started_at: DateTime<Utc>,
    started: Instant,
    closed: AtomicBool,
}

impl<S, L, R> Streamer<S, L, R>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    /// パイプラインを構築して全スレッドを起動
    ///
    /// ワーカー数・キュー深さが0の場合は設定エラー。スレッド起動に失敗した場合は
    /// 起動済みのスレッドを終了させてから `ThreadSpawnError` を返す。
    pub fn new<Src, C>(
        source: Src,
        stage: S,
        host_lock: Arc<L>,
        config: &C,
        reporter: R,
    ) -> StreamerResult<Self>
    where
        Src: ItemSource<Item = S::Input> + 'static,
        C: PipelineConfig + ?Sized,
    {
        let worker_count = config.worker_count();
        let queue_depth = config.queue_depth();

        if worker_count == 0 {
            return Err(StreamerError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if queue_depth == 0 {
            return Err(StreamerError::configuration(
                "キューの深さは1以上である必要があります",
            ));
        }

        let stage = Arc::new(stage);
        let reporter = Arc::new(reporter);
        let shared = Arc::new(SharedState::new());
        let input = Arc::new(BoundedQueue::new(queue_depth, 1));
        let output = Arc::new(BoundedQueue::new(queue_depth, worker_count));

        reporter.report_started(worker_count, queue_depth);
        let started_at = Utc::now();
        let started = Instant::now();

        let workers = match spawn_workers(
            worker_count,
            &stage,
            &input,
            &output,
            &shared,
            &reporter,
        ) {
            Ok(handles) => handles,
            Err(failure) => {
                // プロデューサー不在のまま入力を閉じ、起動済みワーカーを終了させる
                input.finish();
                join_quietly(host_lock.as_ref(), failure.spawned);
                return Err(StreamerError::thread_spawn(
                    failure.role.to_string(),
                    failure.error,
                ));
            }
        };

        let producer = match spawn_producer(
            source,
            stage,
            Arc::clone(&host_lock),
            Arc::clone(&input),
            Arc::clone(&shared),
            Arc::clone(&reporter),
        ) {
            Ok(handle) => handle,
            Err(error) => {
                input.finish();
                join_quietly(host_lock.as_ref(), workers);
                return Err(StreamerError::thread_spawn(
                    ThreadRole::Producer.to_string(),
                    error,
                ));
            }
        };

        log::debug!("Streamer started: {worker_count} workers, queue depth {queue_depth}");

        Ok(Self {
            input,
            output,
            host_lock,
            shared,
            reporter,
            producer: Mutex::new(Some(producer)),
            workers: Mutex::new(workers),
            worker_count,
            queue_depth,
            started_at,
            started,
            closed: AtomicBool::new(false),
        })
    }

    /// 次の結果を取り出す（ブロッキング）
    ///
    /// 待機中はホストロックを手放す。`None` はストリーム終端で、
    /// 以後の呼び出しも `None` を返し続ける。ソース側の失敗は終端として扱う。
    pub fn pull(&self) -> Option<S::Output> {
        let item = self.output.dequeue_releasing(self.host_lock.as_ref());
        if item.is_some() {
            self.shared.record_delivered();
        }
        item
    }

    /// ソース側の失敗を区別する `pull`
    ///
    /// ソースが失敗して終端に達した場合、最初の一回だけ `SourceError` を返し、
    /// 以後は `Ok(None)` を返す。
    pub fn try_pull(&self) -> StreamerResult<Option<S::Output>> {
        match self.pull() {
            Some(item) => Ok(Some(item)),
            None => match self.shared.take_source_error() {
                Some(error) => Err(StreamerError::source(error)),
                None => Ok(None),
            },
        }
    }

    /// ソース側の失敗内容（あれば）
    pub fn source_error(&self) -> Option<String> {
        self.shared.source_error()
    }

    /// 両方のキューが終端に達したか
    pub fn is_finished(&self) -> bool {
        self.output.is_drained() && self.input.is_drained()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// 入力キューに滞留しているタスク数
    pub fn pending_tasks(&self) -> usize {
        self.input.len()
    }

    /// 出力キューに滞留している結果数
    pub fn pending_results(&self) -> usize {
        self.output.len()
    }

    /// 現時点のサマリー
    pub fn stats(&self) -> StreamSummary {
        StreamSummary {
            started_at: self.started_at,
            workers: self.worker_count,
            queue_depth: self.queue_depth,
            produced: self.shared.produced(),
            processed: self.shared.processed(),
            delivered: self.shared.delivered(),
            source_error: self.shared.source_error(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }

    /// パイプラインを終了して全スレッドを join する
    ///
    /// 終端に達していない場合は両キューを中断し、未取得の要素を破棄する。
    pub fn close(self) -> StreamerResult<StreamSummary> {
        self.shutdown()
    }

    /// 共有参照からの終了処理
    ///
    /// 他スレッドで実行中の `pull` は中断により `None` を返す。
    /// 二回目以降の呼び出しはスレッドを join せずにサマリーだけを返す。
    pub(crate) fn shutdown(&self) -> StreamerResult<StreamSummary> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(self.stats());
        }

        if !self.is_finished() {
            log::debug!("Tearing down unfinished stream");
            self.input.abort();
            self.output.abort();
        }

        let producer = self.producer.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());
        let panicked = allow_threads(self.host_lock.as_ref(), || {
            let mut panicked = Vec::new();
            for handle in producer.into_iter().chain(workers) {
                let name = thread_name(&handle);
                if handle.join().is_err() {
                    log::error!("Thread {name} panicked");
                    panicked.push(name);
                }
            }
            panicked
        });

        let summary = self.stats();
        self.reporter.report_completed(&summary);

        match panicked.into_iter().next() {
            Some(role) => Err(StreamerError::thread_panicked(role)),
            None => Ok(summary),
        }
    }
}

impl<S, L, R> Iterator for Streamer<S, L, R>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    type Item = S::Output;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull()
    }
}

impl<S, L, R> Drop for Streamer<S, L, R>
where
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            if let Err(e) = self.shutdown() {
                log::error!("Streamer teardown failed: {e}");
            }
        }
    }
}

fn thread_name(handle: &JoinHandle<()>) -> String {
    handle
        .thread()
        .name()
        .unwrap_or("streamer-thread")
        .to_string()
}

fn join_quietly<L: HostLock + ?Sized>(host_lock: &L, handles: Vec<JoinHandle<()>>) {
    allow_threads(host_lock, || {
        for handle in handles {
            let name = thread_name(&handle);
            if handle.join().is_err() {
                log::error!("Thread {name} panicked during startup rollback");
            }
        }
    });
}
