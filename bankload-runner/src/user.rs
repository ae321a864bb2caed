//! Virtual user: one account, a weighted task loop, and think time

use crate::error::RunnerResult;
use crate::policy::{SkipReason, TransferPolicy};
use crate::state::SharedState;
use crate::stats::{RequestStats, Sample};
use crate::stop::StopSignal;
use crate::tasks::{TaskKind, TaskSet, TRANSFER_AMOUNT_CENTS};
use crate::think_time::ThinkTime;
use bankload_config::{ScenarioConfig, Variant};
use bankload_http::{
    AccountId, ApiResponse, BankApi, Endpoint, HttpError, Report, TransferRequest,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Lifecycle of a virtual user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    Created,
    Starting,
    Running,
    Stopped,
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserState::Created => write!(f, "created"),
            UserState::Starting => write!(f, "starting"),
            UserState::Running => write!(f, "running"),
            UserState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Everything users of one run share
pub struct UserContext {
    pub api: Arc<dyn BankApi>,
    pub shared: Arc<SharedState>,
    pub stats: Arc<RequestStats>,
    pub tasks: TaskSet,
    pub policy: TransferPolicy,
    pub think_time: ThinkTime,
    pub variant: Variant,
    pub salary_cents: u64,
}

impl UserContext {
    pub fn new(
        api: Arc<dyn BankApi>,
        shared: Arc<SharedState>,
        stats: Arc<RequestStats>,
        scenario: &ScenarioConfig,
    ) -> RunnerResult<Self> {
        Ok(Self {
            api,
            shared,
            stats,
            tasks: TaskSet::for_variant(scenario.variant)?,
            policy: TransferPolicy::from(scenario.variant),
            think_time: ThinkTime::from_config(scenario)?,
            variant: scenario.variant,
            salary_cents: scenario.salary_cents,
        })
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("tasks", &self.tasks)
            .field("policy", &self.policy)
            .field("think_time", &self.think_time)
            .field("variant", &self.variant)
            .field("salary_cents", &self.salary_cents)
            .finish()
    }
}

/// Result of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Request answered with a 2xx status
    Completed { status: u16 },
    /// Non-2xx answer, or no answer at all when `status` is `None`
    Failed { status: Option<u16> },
    /// Precondition not met, no request sent
    Skipped(SkipReason),
}

impl TaskOutcome {
    fn from_sample(sample: Sample) -> Self {
        if sample.success {
            TaskOutcome::Completed {
                status: sample.status.unwrap_or_default(),
            }
        } else {
            TaskOutcome::Failed {
                status: sample.status,
            }
        }
    }
}

/// Per-user counters returned when the user stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: usize,
    pub account_id: Option<AccountId>,
    pub tasks_run: u64,
    pub transfers: u64,
    pub reports: u64,
    pub failed: u64,
    pub skipped: u64,
}

pub struct VirtualUser {
    id: usize,
    ctx: Arc<UserContext>,
    account_id: Option<AccountId>,
    state: UserState,
    rng: StdRng,
    summary: UserSummary,
}

impl VirtualUser {
    pub fn new(id: usize, ctx: Arc<UserContext>, rng: StdRng) -> Self {
        Self {
            id,
            ctx,
            account_id: None,
            state: UserState::Created,
            rng,
            summary: UserSummary {
                id,
                ..UserSummary::default()
            },
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> UserState {
        self.state
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn summary(&self) -> &UserSummary {
        &self.summary
    }

    /// Create this user's account.
    ///
    /// The id is stored only for a 200 answer carrying a positive
    /// `accountId`. Peer to peer users also publish it to the pool. There is
    /// no retry: a user without an account skips every transfer.
    pub async fn on_start(&mut self) -> Option<AccountId> {
        self.state = UserState::Starting;

        let started = Instant::now();
        let result = self.ctx.api.create_account(self.ctx.salary_cents).await;
        self.record(Endpoint::CreateAccount, &result, started.elapsed());

        self.account_id = result.as_ref().ok().and_then(AccountId::from_response);
        match self.account_id {
            Some(account_id) => {
                self.ctx.shared.record_account_created();
                if self.ctx.variant == Variant::PeerToPeer {
                    self.ctx.shared.pool().insert(account_id);
                }
                debug!(user = self.id, account_id = %account_id, "Account created");
            }
            None => match &result {
                Ok(response) => {
                    warn!(user = self.id, status = response.status, "Account creation failed");
                }
                Err(e) => warn!(user = self.id, error = %e, "Account creation failed"),
            },
        }

        self.summary.account_id = self.account_id;
        self.state = UserState::Running;
        self.account_id
    }

    pub async fn make_transfer(&mut self) -> TaskOutcome {
        let Some(from) = self.account_id else {
            return self.skip(SkipReason::NoOwnAccount);
        };

        let to = match self.ctx.policy.target(&self.ctx.shared, from, &mut self.rng) {
            Ok(to) => to,
            Err(reason) => return self.skip(reason),
        };

        let transfer = TransferRequest {
            from,
            to,
            amount_cents: TRANSFER_AMOUNT_CENTS,
            reference: self.rng.random::<u64>(),
        };

        let started = Instant::now();
        let result = self.ctx.api.make_transfer(&transfer).await;
        let outcome = self.record(Endpoint::MakeTransfer, &result, started.elapsed());
        trace!(
            user = self.id,
            from = %from,
            to = %to,
            reference = transfer.reference,
            ?outcome,
            "Transfer sent"
        );

        self.summary.transfers += 1;
        outcome
    }

    pub async fn fetch_report(&mut self) -> TaskOutcome {
        let started = Instant::now();
        let result = self.ctx.api.fetch_report().await;
        let outcome = self.record(Endpoint::FetchReport, &result, started.elapsed());

        if let Some(report) = result.as_ref().ok().and_then(Report::from_response) {
            trace!(
                user = self.id,
                transactional_accounts = report.transactional_accounts,
                loan_accounts = report.loan_accounts,
                total_money = %report.total_money,
                "Report fetched"
            );
        }

        self.summary.reports += 1;
        outcome
    }

    pub fn next_task(&mut self) -> TaskKind {
        self.ctx.tasks.choose(&mut self.rng)
    }

    pub async fn run_task(&mut self, kind: TaskKind) -> TaskOutcome {
        self.summary.tasks_run += 1;
        let outcome = match kind {
            TaskKind::MakeTransfer => self.make_transfer().await,
            TaskKind::FetchReport => self.fetch_report().await,
        };
        if matches!(outcome, TaskOutcome::Failed { .. }) {
            self.summary.failed += 1;
        }
        outcome
    }

    /// Drive the user until `stop` fires.
    ///
    /// The stop signal is checked between tasks and interrupts think time.
    /// A request already in flight is awaited.
    pub async fn run(mut self, stop: StopSignal) -> UserSummary {
        if !stop.is_stopped() {
            self.on_start().await;
        }

        while !stop.is_stopped() {
            let kind = self.next_task();
            self.run_task(kind).await;

            let wait = self.ctx.think_time.sample(&mut self.rng);
            tokio::select! {
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.state = UserState::Stopped;
        debug!(user = self.id, tasks = self.summary.tasks_run, "User stopped");
        self.summary
    }

    fn record(
        &self,
        endpoint: Endpoint,
        result: &Result<ApiResponse, HttpError>,
        elapsed: Duration,
    ) -> TaskOutcome {
        let sample = Sample::from_result(result, elapsed);
        self.ctx.stats.record(endpoint.label(), sample);

        if let Err(e) = result {
            debug!(user = self.id, label = endpoint.label(), error = %e, "Request failed");
        }
        TaskOutcome::from_sample(sample)
    }

    fn skip(&mut self, reason: SkipReason) -> TaskOutcome {
        debug!(user = self.id, %reason, "Transfer skipped");
        self.summary.skipped += 1;
        TaskOutcome::Skipped(reason)
    }
}
