
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use cartwatch::cycle::run_poller;

use mock_collaborators::*;

const HOUR: Duration = Duration::from_secs(3_600);

fn shutdown_after(delay: Duration) -> broadcast::Receiver<()> {
    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(());
    });
    rx
}

#[tokio::test(start_paused = true)]
async fn runs_a_cycle_per_interval_until_shutdown() {
    let source = Arc::new(MockSource::with(vec![
        Reply::Data(payload((10.0, 1.0), &[])),
        Reply::Data(payload((20.0, 2.0), &[])),
        Reply::Data(payload((30.0, 3.0), &[])),
        Reply::Data(payload((40.0, 4.0), &[])),
    ]));
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryStore::default());
    let runner = runner(source.clone(), sink.clone(), store.clone(), vec![1], 10);

    let cycles = run_poller(runner, HOUR, shutdown_after(HOUR * 3 + HOUR / 2)).await;

    assert_eq!(cycles, 4);
    assert_eq!(source.requested.lock().len(), 4);
    assert_eq!(sink.messages().len(), 4);

    let rows = store.rows.lock();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].total_add_to_cart, 40);
    assert_eq!(rows[3].new_add_to_cart, 10);
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_start_still_finishes_the_first_cycle() {
    let source = Arc::new(MockSource::with(vec![Reply::Data(payload((10.0, 1.0), &[]))]));
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryStore::default());
    let runner = runner(source, sink.clone(), store.clone(), vec![1], 10);

    let (tx, rx) = broadcast::channel(1);
    tx.send(()).unwrap();

    let cycles = run_poller(runner, HOUR, rx).await;

    assert_eq!(cycles, 1);
    assert_eq!(sink.messages().len(), 1);
    assert_eq!(store.rows.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_and_panicked_cycles_do_not_stop_the_loop() {
    let source = Arc::new(MockSource::with(vec![
        Reply::Panic,
        Reply::Status(500),
        Reply::Data(payload((10.0, 1.0), &[])),
    ]));
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryStore::default());
    let runner = runner(source.clone(), sink.clone(), store.clone(), vec![1], 10);

    let cycles = run_poller(runner, HOUR, shutdown_after(HOUR * 2 + HOUR / 2)).await;

    assert_eq!(cycles, 3);
    assert_eq!(source.requested.lock().len(), 3);
    assert_eq!(sink.messages().len(), 1);
    assert_eq!(store.rows.lock().len(), 1);
}
