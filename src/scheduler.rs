use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio_cron_scheduler::{Job, JobScheduler};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::client::rainbet::AffiliateSource;
use crate::core::cycle::compute_cycle;
use crate::core::leaderboard::Snapshot;
use crate::core::ranking::{rank_with, Unweighted, WagerWeighting};
use crate::error::{BoardError, BoardResult};
use crate::storage::MemoryCache;

const SELF_PING_TIMEOUT_SEC: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache now holds a fresh leaderboard with that many entries.
    Updated(usize),
    /// Refresh failed, the previous snapshot is still served.
    Retained,
    /// Another refresh was still running.
    Skipped,
}

/// Fetches, ranks and caches the current cycle's leaderboard.
/// At most one refresh runs at a time, across all clones.
#[derive(Clone)]
pub struct Refresher {
    source: Arc<dyn AffiliateSource>,
    cache: MemoryCache,
    limit: usize,
    weighting: Arc<dyn WagerWeighting>,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Refresher {
    pub fn new(source: Arc<dyn AffiliateSource>, cache: MemoryCache, limit: usize) -> Self {
        Refresher {
            source,
            cache,
            limit,
            weighting: Arc::new(Unweighted),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_weighting(mut self, weighting: Arc<dyn WagerWeighting>) -> Self {
        self.weighting = weighting;
        self
    }

    pub async fn refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous leaderboard refresh still running, skipping this one.");
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let cycle = compute_cycle(0, now);
        match self.source.fetch_records(&cycle).await {
            Ok(records) => {
                let leaderboard = rank_with(&records, self.limit, self.weighting.as_ref());
                let n_entries = leaderboard.len();
                self.cache
                    .replace(Snapshot::refreshed(cycle, Utc::now(), leaderboard));
                info!("Leaderboard updated for {cycle}");
                RefreshOutcome::Updated(n_entries)
            }
            Err(e) => {
                error!("Could not refresh leaderboard for {cycle}. {e}");
                RefreshOutcome::Retained
            }
        }
    }
}

pub struct Scheduler {
    scheduler: JobScheduler,
    refresher: Refresher,
}

pub enum JobProcess {
    InitializeLeaderboard,
    RefreshLeaderboard(Duration),
    SelfPing(String, Duration),
}

impl Scheduler {
    pub async fn new(refresher: Refresher) -> BoardResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler {
            scheduler,
            refresher,
        })
    }

    pub async fn add_job(&self, job_process: JobProcess) -> BoardResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::InitializeLeaderboard => {
                initialize_leaderboard_job(self.refresher.clone()).await?
            }
            JobProcess::RefreshLeaderboard(interval) => {
                refresh_leaderboard_job(interval, self.refresher.clone()).await?
            }
            JobProcess::SelfPing(url, interval) => self_ping_job(url, interval).await?,
        };
        Ok(self.scheduler.add(job).await?)
    }

    pub async fn start(&self) -> BoardResult<()> {
        Ok(self.scheduler.start().await?)
    }

    pub async fn stop(&mut self) -> BoardResult<()> {
        Ok(self.scheduler.shutdown().await?)
    }
}

//////////////////
// Jobs definition
//////////////////

async fn initialize_leaderboard_job(refresher: Refresher) -> BoardResult<Job> {
    let job = Job::new_one_shot_async(Duration::from_secs(0), move |_uuid, _l| {
        let refresher = refresher.clone();
        Box::pin(async move {
            refresher.refresh(Utc::now()).await;
        })
    })?;
    Ok(job)
}

async fn refresh_leaderboard_job(interval: Duration, refresher: Refresher) -> BoardResult<Job> {
    let job = Job::new_repeated_async(interval, move |uuid, mut l| {
        let refresher = refresher.clone();
        Box::pin(async move {
            refresher.refresh(Utc::now()).await;

            // Query the next execution time for this job
            let next_tick = l.next_tick_for_job(uuid).await;
            match next_tick {
                Ok(Some(ts)) => info!("Next leaderboard refresh at {:?}", ts),
                _ => error!("Could not get next tick for leaderboard refresh job"),
            }
        })
    })?;
    Ok(job)
}

async fn self_ping_job(url: String, interval: Duration) -> BoardResult<Job> {
    let http_client = Client::builder()
        .timeout(Duration::from_secs(SELF_PING_TIMEOUT_SEC))
        .build()
        .map_err(|e| BoardError::Config(format!("Could not build HTTP client. {e}")))?;

    let job = Job::new_repeated_async(interval, move |_uuid, _l| {
        let http_client = http_client.clone();
        let url = url.clone();
        Box::pin(async move {
            match http_client.get(&url).send().await {
                Ok(_) => info!("Self-pinged {url}"),
                Err(e) => warn!("Self-ping failed. {e}"),
            }
        })
    })?;
    Ok(job)
}
