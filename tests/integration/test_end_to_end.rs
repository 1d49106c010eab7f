// エンドツーエンド統合テスト
use crate::fixtures::RecordingStage;
use std::collections::HashSet;
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use streamer::{
    cli::{execute_digest, execute_range, DigestConfig, RangeConfig},
    collect_all,
    services::{
        DefaultPipelineConfig, FileDigest, IdentityStage, IterSource, NoHostLock,
        NoOpProgressReporter,
    },
    stream_iter, Streamer,
};
use tempfile::TempDir;

#[test]
fn test_single_worker_preserves_source_order() {
    let streamer = stream_iter(vec![1, 2, 3], IdentityStage::<i32>::new(), 1, 2).unwrap();

    assert_eq!(streamer.pull(), Some(1));
    assert_eq!(streamer.pull(), Some(2));
    assert_eq!(streamer.pull(), Some(3));
    assert_eq!(streamer.pull(), None);
    assert_eq!(streamer.pull(), None);

    let summary = streamer.close().unwrap();
    assert_eq!(summary.delivered, 3);
    assert_eq!(summary.discarded(), 0);
}

#[test]
fn test_many_workers_deliver_a_permutation() {
    let stage = RecordingStage::with_delay(Duration::from_millis(1));
    let calls = stage.calls();
    let config = DefaultPipelineConfig::new(4)
        .with_queue_depth(2)
        .with_progress_reporting(false);

    let streamer = Streamer::new(
        IterSource::new(1..=9u32),
        stage,
        Arc::new(NoHostLock),
        &config,
        NoOpProgressReporter::new(),
    )
    .unwrap();

    let (results, summary) = collect_all(streamer).unwrap();

    let unique: HashSet<u32> = results.iter().copied().collect();
    assert_eq!(results.len(), 9);
    assert_eq!(unique, (1..=9).collect::<HashSet<u32>>());
    assert_eq!(calls.stage1.load(Ordering::SeqCst), 9);
    assert_eq!(calls.stage2.load(Ordering::SeqCst), 9);
    assert_eq!(summary.processed, 9);
}

#[test]
fn test_stages_run_off_the_consumer_thread() {
    let stage = RecordingStage::default();
    let calls = stage.calls();
    let config = DefaultPipelineConfig::new(3).with_queue_depth(4);

    let streamer = Streamer::new(
        IterSource::new(0..50u32),
        stage,
        Arc::new(NoHostLock),
        &config,
        NoOpProgressReporter::new(),
    )
    .unwrap();
    let _: Vec<u32> = std::iter::from_fn(|| streamer.pull()).collect();
    streamer.close().unwrap();

    let consumer = std::thread::current().id();

    // stage1 は専用のプロデューサースレッド1本だけで実行される
    let producer_threads = calls.stage1_threads.lock();
    assert_eq!(producer_threads.len(), 1);
    assert!(!producer_threads.contains(&consumer));

    let worker_threads = calls.stage2_threads.lock();
    assert!(!worker_threads.is_empty());
    assert!(worker_threads.len() <= 3);
    assert!(!worker_threads.contains(&consumer));
    assert!(producer_threads.is_disjoint(&worker_threads));
}

#[test]
fn test_iterator_interface() {
    let streamer = stream_iter(0..100u64, IdentityStage::<u64>::new(), 2, 8).unwrap();
    let total: u64 = streamer.sum();
    assert_eq!(total, (0..100u64).sum::<u64>());
}

#[test]
fn test_range_command_output() {
    let mut out = Vec::new();
    let summary = execute_range(
        RangeConfig {
            count: 10,
            workers: Some(1),
            depth: 3,
            summary: false,
        },
        &mut out,
    )
    .unwrap();

    let expected: String = (0..10).map(|i| format!("{i}\n")).collect();
    assert_eq!(String::from_utf8(out).unwrap(), expected);
    assert_eq!(summary.delivered, 10);
}

#[tokio::test]
async fn test_digest_command_over_nested_tree() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    for dir in ["a", "a/b", "c"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    for (i, name) in ["one.txt", "a/two.txt", "a/b/three.txt", "c/four.txt"]
        .iter()
        .enumerate()
    {
        fs::write(root.join(name), vec![b'x'; i + 1]).unwrap();
    }
    let output = temp_dir.path().join("digests.jsonl");

    let summary = execute_digest(DigestConfig {
        directory: root,
        workers: Some(3),
        depth: 2,
        output: Some(output.clone()),
    })
    .await
    .unwrap();

    let digests: Vec<FileDigest> = fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(summary.delivered, 4);
    assert_eq!(digests.len(), 4);
    let mut sizes: Vec<u64> = digests.iter().map(|d| d.size).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![1, 2, 3, 4]);
    assert!(digests.iter().all(|d| d.digest.as_ref().map(String::len) == Some(16)));
}
