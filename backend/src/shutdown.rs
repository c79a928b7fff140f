//! Stop signal for the poll loop.

use std::future::Future;

use tokio::sync::broadcast;
use tracing::info;

/// Fires once on SIGINT or SIGTERM.
///
/// The handlers are installed before this returns. One that cannot be
/// installed is logged and never fires; the other one still works.
pub fn shutdown_signal() -> broadcast::Receiver<()> {
    let (tx, rx) = broadcast::channel(1);
    let stop = stop_requested();

    tokio::spawn(async move {
        stop.await;
        let _ = tx.send(());
    });

    rx
}

#[cfg(unix)]
fn stop_requested() -> impl Future<Output = ()> + Send + 'static {
    use tokio::signal::unix::SignalKind;

    let mut interrupt = unix::install(SignalKind::interrupt(), "SIGINT");
    let mut terminate = unix::install(SignalKind::terminate(), "SIGTERM");

    async move {
        tokio::select! {
            _ = unix::recv(&mut interrupt) => info!("received SIGINT"),
            _ = unix::recv(&mut terminate) => info!("received SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
fn stop_requested() -> impl Future<Output = ()> + Send + 'static {
    async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C"),
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(unix)]
mod unix {
    use tokio::signal::unix::{Signal, SignalKind, signal};
    use tracing::error;

    pub(super) fn install(kind: SignalKind, name: &'static str) -> Option<Signal> {
        match signal(kind) {
            Ok(sig) => Some(sig),
            Err(e) => {
                error!(signal = name, error = %e, "failed to install signal handler");
                None
            }
        }
    }

    pub(super) async fn recv(sig: &mut Option<Signal>) {
        match sig {
            Some(sig) => {
                sig.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
