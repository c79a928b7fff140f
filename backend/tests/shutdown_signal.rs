#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use cartwatch::shutdown::shutdown_signal;

#[tokio::test]
async fn sigterm_fires_the_shutdown_receiver() {
    let mut rx = shutdown_signal();

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("shutdown signal did not fire")
        .unwrap();
}
