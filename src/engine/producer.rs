// Producer - ソースから要素を取り出し stage1 を適用して入力キューへ配信

use super::{queue::FinishGuard, BoundedQueue, SharedState};
use crate::core::{
    HostLock, HostLockGuard, ItemSource, PipelineStage, ProgressReporter, ThreadRole,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// ソースをホストロック下で破棄するガード
///
/// stage1 のパニックによる巻き戻しでもロックを取ってから破棄する。
struct HostOwned<'a, Src: ItemSource, L: HostLock + ?Sized> {
    source: Option<Src>,
    lock: &'a L,
}

impl<'a, Src: ItemSource, L: HostLock + ?Sized> HostOwned<'a, Src, L> {
    fn new(source: Src, lock: &'a L) -> Self {
        Self {
            source: Some(source),
            lock,
        }
    }

    fn next_item(&mut self) -> anyhow::Result<Option<Src::Item>> {
        match self.source.as_mut() {
            Some(source) => source.next_item(),
            None => Ok(None),
        }
    }
}

impl<Src: ItemSource, L: HostLock + ?Sized> Drop for HostOwned<'_, Src, L> {
    fn drop(&mut self) {
        let _host = HostLockGuard::new(self.lock);
        self.source.take();
    }
}

/// Producer: 専用スレッドでソースを読み切る
///
/// ソースの呼び出しはホストロック保持中に行い、stage1 と投入はロック外で行う。
/// 枯渇・失敗・パニックのいずれでも入力キューの `finish` が一度だけ呼ばれる。
pub fn spawn_producer<Src, S, L, R>(
    source: Src,
    stage: Arc<S>,
    host_lock: Arc<L>,
    input: Arc<BoundedQueue<S::Task>>,
    shared: Arc<SharedState>,
    reporter: Arc<R>,
) -> std::io::Result<JoinHandle<()>>
where
    Src: ItemSource<Item = S::Input> + 'static,
    S: PipelineStage + 'static,
    L: HostLock + 'static,
    R: ProgressReporter + 'static,
{
    thread::Builder::new()
        .name(ThreadRole::Producer.to_string())
        .spawn(move || {
            let _finish = FinishGuard::new(input.as_ref());
            let mut source = HostOwned::new(source, host_lock.as_ref());
            let mut produced = 0usize;

            loop {
                if input.is_aborted() {
                    log::debug!("Producer stopping: input queue aborted");
                    break;
                }

                let next = {
                    let _host = HostLockGuard::new(host_lock.as_ref());
                    source.next_item()
                };

                match next {
                    Ok(Some(item)) => {
                        let task = stage.stage1(item);
                        input.enqueue(task);
                        shared.record_produced();
                        produced += 1;
                    }
                    Ok(None) => break,
                    Err(error) => {
                        reporter.report_source_error(&format!("{error:#}"));
                        shared.record_source_error(error);
                        break;
                    }
                }
            }

            // ソースはホスト所有の値である可能性があるためロック下で破棄する
            drop(source);

            log::debug!("Producer finished after {produced} items");
            reporter.report_source_finished(produced);
        })
}
