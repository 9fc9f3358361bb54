mod common;

use common::*;
use dmlabel::{BatchError, BatchMode, BatchRequest, BatchWorker, HistoryStore, MemoryHistory};
use std::sync::Arc;

fn request(raw: &[&str], copies: u32, mode: BatchMode) -> BatchRequest {
    BatchRequest {
        codes: codes(raw),
        copies,
        device: device(),
        mode,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_worker_runs_batches_in_order() {
    let spooler = RecordingSpooler::default();
    let history = Arc::new(MemoryHistory::new());
    let worker = BatchWorker::spawn(controller(spooler.clone(), history.clone()));

    let first = worker.submit(request(&["A", "B"], 1, BatchMode::Print)).await.unwrap();
    assert_eq!((first.printed, first.feeds), (2, 1));

    let second = worker.submit(request(&["A"], 2, BatchMode::Reprint)).await.unwrap();
    assert_eq!((second.printed, second.feeds), (2, 1));
    assert_ne!(first.batch_id, second.batch_id);

    worker.shutdown().await;

    assert_eq!(history.recent_codes(10).unwrap(), codes(&["B", "A"]));
    assert_eq!(spooler.count(|e| matches!(e, Event::Print(_))), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_worker_rejects_bad_copies() {
    let spooler = RecordingSpooler::default();
    let worker = BatchWorker::spawn(controller(spooler.clone(), Arc::new(MemoryHistory::new())));

    let err = worker.submit(request(&["A"], 0, BatchMode::Print)).await.unwrap_err();
    assert!(matches!(err, BatchError::Validation(_)));

    // still serving after a rejected request
    let report = worker.submit(request(&["A"], 1, BatchMode::Print)).await.unwrap();
    assert_eq!(report.printed, 1);

    worker.shutdown().await;
    assert_eq!(spooler.count(|e| matches!(e, Event::Print(_))), 1);
}
