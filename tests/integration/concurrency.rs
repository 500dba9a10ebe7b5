//! Concurrency and race condition tests
//!
//! These tests verify thread-safety and concurrent operation:
//! - Several writers appending to watched files at once
//! - Readers querying the stores while lines are ingested
//! - Concurrent on-demand sampling against a bounded store

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log_metrics_collector::{
    Collector, Severity,
    logs::LogTailer,
    storage::{BoundedLogStore, LogStats},
};
use tempfile::tempdir;

use crate::helpers::*;

fn counted(stats: &LogStats) -> u64 {
    Severity::ALL.iter().map(|level| stats.count(*level)).sum()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_each_line_once() {
    let dir = tempdir().unwrap();
    let collector = Arc::new(Collector::with_probe(
        create_test_config(vec![dir.path().to_path_buf()], 1000, 10),
        Arc::new(FakeProbe::default()),
    ));
    collector.start(IDLE_INTERVAL).await;

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let path = dir.path().join(format!("writer-{w}.log"));
            thread::spawn(move || {
                for i in 0..50 {
                    append_lines(&path, &[&format!("[INFO] writer {w} line {i}")]);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let arrived = wait_until(WATCH_TIMEOUT, || collector.log_stats().total_entries == 200).await;
    assert!(arrived, "got {:?}", collector.log_stats());

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    let logs = collector.recent_logs(None, None);
    assert_eq!(logs.len(), 200);

    for w in 0..4 {
        let messages: Vec<&str> = logs
            .iter()
            .filter(|entry| entry.file == format!("writer-{w}.log"))
            .map(|entry| entry.message.as_str())
            .collect();
        let expected: Vec<String> = (0..50)
            .map(|i| format!("[INFO] writer {w} line {i}"))
            .collect();
        // per-file order is preserved
        assert_eq!(messages, expected);
    }

    collector.stop().await;
}

#[test]
fn test_readers_never_see_torn_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("busy.log");
    let store = Arc::new(BoundedLogStore::new(NonZeroUsize::new(32).unwrap()));
    let tailer = Arc::new(LogTailer::new(store.clone()));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_total = 0;
                while !done.load(Ordering::SeqCst) {
                    let stats = store.stats();
                    assert_eq!(counted(&stats), stats.total_entries);
                    assert!(stats.total_entries >= last_total);
                    last_total = stats.total_entries;

                    let recent = store.recent(None, None);
                    assert!(recent.len() <= 32);

                    let errors = store.recent(Some(5), Some(Severity::Error));
                    assert!(errors.len() <= 5);
                    assert!(errors.iter().all(|entry| entry.level == Severity::Error));
                }
            })
        })
        .collect();

    for i in 0..300 {
        let level = if i % 3 == 0 { "ERROR" } else { "INFO" };
        append_lines(&path, &[&format!("[{level}] event {i}")]);
        tailer.on_file_changed(&path);
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        reader.join().unwrap();
    }

    let stats = store.stats();
    assert_eq!(stats.total_entries, 300);
    assert_eq!(stats.error_count, 100);
    assert_eq!(store.len(), 32);
    assert_eq!(
        store.recent(Some(1), None)[0].message,
        "[INFO] event 299"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sample_requests() {
    let dir = tempdir().unwrap();
    let collector = Arc::new(Collector::with_probe(
        create_test_config(vec![dir.path().to_path_buf()], 10, 5),
        Arc::new(FakeProbe::default()),
    ));
    collector.start(IDLE_INTERVAL).await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let collector = collector.clone();
            tokio::spawn(async move { collector.sample_now().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let history = collector.metrics_history(None);
    assert_eq!(history.len(), 5);

    // samples never overlap, so the probe's counter is strictly increasing
    let processes: Vec<usize> = history.iter().map(|s| s.processes).collect();
    assert!(processes.windows(2).all(|w| w[0] + 1 == w[1]));

    collector.stop().await;
}
