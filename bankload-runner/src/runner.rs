//! Run scheduler: global setup, user ramp-up, stop and join

use crate::error::{RunnerError, RunnerResult};
use crate::setup::{global_setup, SetupReport};
use crate::state::SharedState;
use crate::stats::{RequestStats, StatsReport};
use crate::stop::{StopReason, StopSignal};
use crate::user::{UserContext, UserSummary, VirtualUser};
use bankload_config::{LoadConfig, ScenarioConfig, Variant};
use bankload_http::{AccountId, BankApi};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub variant: Variant,
    pub started_at: DateTime<Utc>,
    #[serde(with = "bankload_config::serde_duration_millis")]
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    pub setup: SetupReport,
    pub users_spawned: usize,
    pub users_with_account: usize,
    /// Users still busy after the stop timeout
    pub users_aborted: usize,
    pub shared_account: Option<AccountId>,
    pub pool_size: usize,
    pub requests_per_second: f64,
    pub stats: StatsReport,
    #[serde(skip)]
    pub users: Vec<UserSummary>,
}

/// Drives one load test against a [`BankApi`]
pub struct LoadRunner {
    api: Arc<dyn BankApi>,
    load: LoadConfig,
    scenario: ScenarioConfig,
    seed: Option<u64>,
}

impl LoadRunner {
    pub fn new(api: Arc<dyn BankApi>, load: LoadConfig, scenario: ScenarioConfig) -> Self {
        Self {
            api,
            load,
            scenario,
            seed: None,
        }
    }

    /// Seed the per-user random generators for a reproducible task mix
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run until `stop` fires or the configured run time elapses.
    ///
    /// Users are spawned at `spawn_rate` after global setup. Once stopped,
    /// users get `stop_timeout` to finish their current task, then the rest
    /// are aborted.
    pub async fn run(&self, stop: StopSignal) -> RunnerResult<RunSummary> {
        if self.load.users == 0 {
            return Err(RunnerError::InvalidLoad("users must be greater than 0".to_string()));
        }
        let spawn_interval = self.load.spawn_interval().ok_or_else(|| {
            RunnerError::InvalidLoad(format!("spawn rate {} is not usable", self.load.spawn_rate))
        })?;

        let shared = Arc::new(SharedState::new());
        let stats = Arc::new(RequestStats::new()?);
        let ctx = Arc::new(UserContext::new(
            self.api.clone(),
            shared.clone(),
            stats.clone(),
            &self.scenario,
        )?);

        let started_at = Utc::now();
        let started = Instant::now();
        info!(
            variant = %self.scenario.variant,
            users = self.load.users,
            spawn_rate = self.load.spawn_rate,
            run_time = ?self.load.run_time,
            "Starting load test"
        );

        let epoch_start_time = u64::try_from(started_at.timestamp()).unwrap_or_default();
        let setup = global_setup(self.api.as_ref(), &shared, &self.scenario, epoch_start_time).await;

        let deadline = self.load.run_time.map(|run_time| {
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = stop.stopped() => {}
                    _ = tokio::time::sleep(run_time) => {
                        if stop.trigger(StopReason::RunTimeElapsed) {
                            info!(?run_time, "Run time elapsed");
                        }
                    }
                }
            })
        });

        let mut seeds = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut users = JoinSet::new();
        let mut users_spawned = 0;
        for id in 0..self.load.users {
            if stop.is_stopped() {
                break;
            }

            let user = VirtualUser::new(id, ctx.clone(), StdRng::seed_from_u64(seeds.random()));
            users.spawn(user.run(stop.clone()));
            users_spawned += 1;
            debug!(user = id, "User spawned");

            if users_spawned < self.load.users {
                tokio::select! {
                    _ = stop.stopped() => break,
                    _ = tokio::time::sleep(spawn_interval) => {}
                }
            }
        }
        if users_spawned == self.load.users {
            info!(users = users_spawned, "All users spawned");
        }

        let stop_reason = stop.stopped().await;
        info!(reason = %stop_reason, "Stopping users");
        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let mut summaries = Vec::with_capacity(users_spawned);
        let drained = tokio::time::timeout(self.load.stop_timeout, async {
            while let Some(joined) = users.join_next().await {
                match joined {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => warn!(error = %e, "User task failed"),
                }
            }
        })
        .await;

        let mut users_aborted = 0;
        if drained.is_err() {
            users_aborted = users.len();
            warn!(
                users = users_aborted,
                stop_timeout = ?self.load.stop_timeout,
                "Aborting users still running after stop timeout"
            );
            users.shutdown().await;
        }

        let elapsed = started.elapsed();
        let report = stats.snapshot();
        summaries.sort_by_key(|summary| summary.id);

        let summary = RunSummary {
            variant: self.scenario.variant,
            started_at,
            elapsed,
            stop_reason,
            setup,
            users_spawned,
            users_with_account: shared.accounts_created(),
            users_aborted,
            shared_account: shared.shared_account(),
            pool_size: shared.pool().len(),
            requests_per_second: report.requests_per_second(elapsed),
            stats: report,
            users: summaries,
        };

        info!(
            requests = summary.stats.total.requests,
            failures = summary.stats.total.failures,
            elapsed = ?summary.elapsed,
            "Load test finished"
        );
        Ok(summary)
    }
}
