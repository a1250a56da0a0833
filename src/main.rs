use wager_board::cli::Cli;
use wager_board::client::rainbet::Rainbet;
use wager_board::config::Settings;
use wager_board::handlers::AppState;
use wager_board::scheduler::{JobProcess, Refresher, Scheduler};
use wager_board::server::ApiServer;
use wager_board::storage::MemoryCache;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load(Cli::parse())?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    let source = Arc::new(Rainbet::new(
        settings.rainbet_base_url.clone(),
        settings.rainbet_api_timeout(),
        settings.rainbet_api_key.clone(),
    )?);
    let cache = MemoryCache::new();

    let refresher = Refresher::new(source.clone(), cache.clone(), settings.leaderboard_size);
    let sched = Scheduler::new(refresher).await?;

    let mut jobs = vec![
        JobProcess::InitializeLeaderboard, // only ran once, at startup.
        JobProcess::RefreshLeaderboard(settings.refresh_interval()),
    ];
    if let Some(url) = &settings.self_ping_url {
        jobs.push(JobProcess::SelfPing(
            url.clone(),
            settings.self_ping_interval(),
        ));
    }
    for job in jobs {
        sched.add_job(job).await?;
    }

    info!("Starting scheduler.");
    sched.start().await?;

    info!("Starting HTTP server.");
    let state = AppState::new(cache, source, settings.leaderboard_size);
    ApiServer::new(state)
        .serve(&format!("0.0.0.0:{}", settings.port))
        .await?;

    Ok(())
}
