mod cli;

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use cartwatch::{
    analytics::OzonClient,
    config::AppConfig,
    cycle::{CycleRunner, run_cycle, run_poller},
    logger::init_tracing,
    notify::telegram::TelegramSink,
    shutdown::shutdown_signal,
    store::open_store,
};

use crate::cli::Cli;

/// Wires the HTTP clients and the data log into a runner.
async fn build_runner(cfg: &AppConfig) -> anyhow::Result<Arc<CycleRunner>> {
    let source = OzonClient::new(
        &cfg.ozon_api_url,
        cfg.ozon_client_id.clone(),
        cfg.ozon_api_token.clone(),
        cfg.analytics_limit,
        cfg.http_timeout,
    )
    .context("failed to build analytics client")?;

    let sink = TelegramSink::new(&cfg.telegram_api_url, &cfg.telegram_token, cfg.http_timeout)
        .context("failed to build telegram client")?;

    let store = open_store(cfg).await.context("failed to open data log")?;

    Ok(Arc::new(CycleRunner::new(
        Arc::new(source),
        Arc::new(sink),
        store,
        cfg.recipients.clone(),
        cfg.conversion_threshold,
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.env_file {
        Some(path) => AppConfig::from_env_file(path)?,
        None => AppConfig::from_env()?,
    };
    init_tracing(cfg.json_logs, cfg.activity_log.as_deref())?;

    tracing::info!(
        recipients = cfg.recipients.len(),
        threshold_pct = cfg.conversion_threshold,
        every_secs = cfg.poll_interval.as_secs(),
        "starting cartwatch"
    );
    tracing::debug!(config = ?cfg, "configuration loaded");

    let runner = build_runner(&cfg).await?;

    if cli.once {
        let outcome = run_cycle(&runner, Local::now().naive_local()).await;
        if outcome.is_none() {
            anyhow::bail!("cycle did not complete");
        }
        return Ok(());
    }

    let cycles = run_poller(runner, cfg.poll_interval, shutdown_signal()).await;
    tracing::info!(cycles, "cartwatch stopped");

    Ok(())
}
